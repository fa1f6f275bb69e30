use crate::protocol::{Command, Request, Response};
use docstore_core::{CoreResult, Store};
use tracing::{debug, info};

/// Route one request to the store. Every failure, whether in validation or in
/// the store, becomes an `ok: false` response.
pub fn dispatch(store: &Store, request: Request) -> Response {
    let command = match Command::try_from(request) {
        Ok(command) => command,
        Err(err) => {
            debug!(error = %err, "rejected request");
            return Response::error(err.to_string());
        }
    };

    let name = command.name();
    let mutation = command.is_mutation();
    match execute(store, command) {
        Ok(response) => {
            if mutation {
                info!(cmd = name, "applied");
            }
            response
        }
        Err(err) => {
            debug!(cmd = name, error = %err, "command failed");
            Response::error(err.to_string())
        }
    }
}

fn execute(store: &Store, command: Command) -> CoreResult<Response> {
    let response = match command {
        Command::CreateCollection { name, config } => {
            store.create_collection(&name, config)?;
            Response::ok()
        }
        Command::GetCollection { name } => {
            store.get_collection(&name)?;
            Response::ok()
        }
        Command::DeleteCollection { name } => {
            store.delete_collection(&name)?;
            Response::ok()
        }
        Command::ListCollections => Response::with_names(store.list_collections()),
        Command::Put { collection, doc } => {
            store.get_collection(&collection)?.put(doc)?;
            Response::ok()
        }
        Command::Get { collection, key } => {
            Response::with_doc(store.get_collection(&collection)?.get(&key)?)
        }
        Command::Delete { collection, key } => {
            store.get_collection(&collection)?.delete(&key)?;
            Response::ok()
        }
        Command::List { collection } => {
            Response::with_docs(store.get_collection(&collection)?.list())
        }
        Command::CreateIndex {
            collection,
            field_name,
        } => {
            store.get_collection(&collection)?.create_index(&field_name)?;
            Response::ok()
        }
        Command::DeleteIndex {
            collection,
            field_name,
        } => {
            store.get_collection(&collection)?.delete_index(&field_name)?;
            Response::ok()
        }
        Command::Query {
            collection,
            field_name,
            params,
        } => Response::with_docs(
            store
                .get_collection(&collection)?
                .query(&field_name, &params)?,
        ),
    };
    Ok(response)
}
