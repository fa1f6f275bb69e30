use anyhow::{anyhow, bail, Context, Result};
use docstore_core::{convert, CollectionConfig, QueryParams};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use tracing::info;

use crate::{
    cli::ClientArgs,
    codec::{read_message, write_message},
    protocol::{Command, Request, Response},
};

const HELP: &str = "\
commands:
  create <name> <primary_key>        create a collection
  collection <name>                  check that a collection exists
  drop <name>                        delete a collection
  collections                        list collection names
  put <collection> <json-object>     insert or replace a document
  get <collection> <key>             fetch a document
  delete <collection> <key>          delete a document
  list <collection>                  list all documents
  index <collection> <field>         create an index
  drop-index <collection> <field>    delete an index
  query <collection> <field> [min=<v>] [max=<v>] [desc]
  {...}                              send a raw JSON request
  help | quit";

/// A blocking connection to a docstore server.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
        })
    }

    /// Send one request and wait for its response.
    pub fn send(&mut self, request: &Request) -> io::Result<Response> {
        write_message(&mut self.writer, request)?;
        read_message(&mut self.reader)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "server closed the connection")
        })
    }

    pub fn execute(&mut self, command: Command) -> io::Result<Response> {
        self.send(&Request::from(command))
    }
}

/// One parsed line of interactive input.
#[derive(Debug, PartialEq)]
pub enum Input {
    Request(Request),
    Help,
    Quit,
}

pub fn run(args: ClientArgs) -> Result<()> {
    let mut client = Client::connect(args.server)
        .with_context(|| format!("failed to connect to {}", args.server))?;
    info!("connected to {}", args.server);
    eprintln!("Connected to {}. Type `help` for commands.", args.server);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_input(&line) {
            Ok(Input::Request(request)) => request,
            Ok(Input::Help) => {
                println!("{HELP}");
                continue;
            }
            Ok(Input::Quit) => break,
            Err(err) => {
                println!("error: {err}");
                continue;
            }
        };

        let response = client.send(&request).context("request failed")?;
        println!("{}", render_response(&response));
    }
    Ok(())
}

/// Split off the first whitespace-delimited token.
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(pos) => Some((&input[..pos], &input[pos..])),
        None => Some((input, "")),
    }
}

fn arg<'a>(rest: &mut &'a str, what: &str) -> Result<String> {
    let (token, tail) = next_token(*rest).ok_or_else(|| anyhow!("missing {what}"))?;
    *rest = tail;
    Ok(token.to_owned())
}

pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.starts_with('{') {
        let request: Request = serde_json::from_str(line).context("invalid JSON request")?;
        return Ok(Input::Request(request));
    }

    let mut rest = line;
    let verb = arg(&mut rest, "command")?;
    let command = match verb.as_str() {
        "help" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "create" => Command::CreateCollection {
            name: arg(&mut rest, "collection name")?,
            config: Some(CollectionConfig::new(arg(&mut rest, "primary key")?)),
        },
        "collection" => Command::GetCollection {
            name: arg(&mut rest, "collection name")?,
        },
        "drop" => Command::DeleteCollection {
            name: arg(&mut rest, "collection name")?,
        },
        "collections" => Command::ListCollections,
        "put" => {
            let collection = arg(&mut rest, "collection")?;
            let json: serde_json::Value =
                serde_json::from_str(rest.trim()).context("invalid document JSON")?;
            let doc = convert::json_to_document(json)?;
            rest = "";
            Command::Put { collection, doc }
        }
        "get" => Command::Get {
            collection: arg(&mut rest, "collection")?,
            key: arg(&mut rest, "key")?,
        },
        "delete" => Command::Delete {
            collection: arg(&mut rest, "collection")?,
            key: arg(&mut rest, "key")?,
        },
        "list" => Command::List {
            collection: arg(&mut rest, "collection")?,
        },
        "index" => Command::CreateIndex {
            collection: arg(&mut rest, "collection")?,
            field_name: arg(&mut rest, "field")?,
        },
        "drop-index" => Command::DeleteIndex {
            collection: arg(&mut rest, "collection")?,
            field_name: arg(&mut rest, "field")?,
        },
        "query" => {
            let collection = arg(&mut rest, "collection")?;
            let field_name = arg(&mut rest, "field")?;
            let mut params = QueryParams::new();
            while let Some((token, tail)) = next_token(rest) {
                rest = tail;
                if let Some(min) = token.strip_prefix("min=") {
                    params.min_value = Some(min.to_owned());
                } else if let Some(max) = token.strip_prefix("max=") {
                    params.max_value = Some(max.to_owned());
                } else if token == "desc" {
                    params.desc = true;
                } else {
                    bail!("unexpected query option `{token}`");
                }
            }
            Command::Query {
                collection,
                field_name,
                params,
            }
        }
        other => bail!("unknown command `{other}` (try `help`)"),
    };
    if !rest.trim().is_empty() {
        bail!("unexpected trailing input `{}`", rest.trim());
    }
    Ok(Input::Request(Request::from(command)))
}

pub fn render_response(response: &Response) -> String {
    if !response.ok {
        return format!("error: {}", response.err.as_deref().unwrap_or("unknown error"));
    }
    if let Some(names) = &response.names {
        return format!("names: [{}]", names.join(", "));
    }
    if let Some(doc) = &response.doc {
        return format!("doc: {}", doc.to_json());
    }
    if let Some(docs) = &response.docs {
        let mut out = format!("docs: {} document(s)", docs.len());
        for (i, doc) in docs.iter().enumerate() {
            out.push_str(&format!("\n  [{i}] {}", doc.to_json()));
        }
        return out;
    }
    "ok".to_string()
}
