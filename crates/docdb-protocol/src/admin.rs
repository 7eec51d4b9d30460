//! Builders for administrative and diagnostic command documents.
//!
//! These produce the documents only; running them is the caller's job. Each
//! builder keeps the command name as the first key, which the wire format
//! requires.

use bson::{Bson, Document, doc};

/// `replSetGetStatus` against the `admin` database.
#[must_use]
pub fn repl_set_get_status() -> Document {
    doc! { "replSetGetStatus": 1_i32 }
}

/// `serverStatus` against the `admin` database.
#[must_use]
pub fn server_status() -> Document {
    doc! { "serverStatus": 1_i32 }
}

/// `validate` for a collection, decorated with caller options.
///
/// Every option key is copied onto the command except `session`, which is
/// driver bookkeeping rather than a server option.
#[must_use]
pub fn validate_collection(collection: &str, options: &Document) -> Document {
    let mut command = doc! { "validate": collection };
    for (key, value) in options {
        if key != "session" {
            command.insert(key.clone(), value.clone());
        }
    }
    command
}

/// `collStats` for a collection, optionally scaled.
#[must_use]
pub fn coll_stats(collection: &str, scale: Option<i32>) -> Document {
    let mut command = doc! { "collStats": collection };
    if let Some(scale) = scale {
        command.insert("scale", scale);
    }
    command
}

/// `dbStats` for the database the command is run against.
#[must_use]
pub fn db_stats(scale: Option<i32>) -> Document {
    let mut command = doc! { "dbStats": 1_i32 };
    if let Some(scale) = scale {
        command.insert("scale", scale);
    }
    command
}

/// `$eval` of server-side JavaScript with positional parameters.
///
/// `nolock` asks the server to skip the global write lock it would otherwise
/// hold for the duration of the evaluation.
#[must_use]
pub fn eval(code: &str, parameters: Vec<Bson>, nolock: Option<bool>) -> Document {
    let mut command = doc! {
        "$eval": Bson::JavaScriptCode(code.to_string()),
        "args": parameters,
    };
    if let Some(nolock) = nolock {
        command.insert("nolock", nolock);
    }
    command
}
