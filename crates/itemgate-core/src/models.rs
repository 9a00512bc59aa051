use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

use crate::{ClassificationError, Document};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum App {
    HelpDesk,
    LikeATrello,
}

impl App {
    pub fn database_name(&self) -> &'static str {
        match self {
            App::HelpDesk => "help-desk",
            App::LikeATrello => "like-a-trello",
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.database_name())
    }
}

impl FromStr for App {
    type Err = ClassificationError;

    fn from_str(app: &str) -> Result<Self, Self::Err> {
        match app {
            "help-desk" => Ok(App::HelpDesk),
            "like-a-trello" => Ok(App::LikeATrello),
            other => Err(ClassificationError::UnknownApp(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Fetch,
    New,
    Update,
    Delete,
    Batch,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Fetch => "fetch",
            Action::New => "new",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Batch => "batch",
        };

        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = ClassificationError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "fetch" => Ok(Action::Fetch),
            "new" => Ok(Action::New),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "batch" => Ok(Action::Batch),
            other => Err(ClassificationError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HelpDeskTicket {
    pub id: String,
    pub done: bool,
    pub name: String,
    pub description: String,
    pub date: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Todo,
    Doing,
    Done,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct File {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Milliseconds since the unix epoch, as browsers report it.
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    pub link: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardFiles {
    One(File),
    Many(Vec<File>),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BoardCard {
    pub id: String,
    pub order: i64,
    pub column: Column,
    pub name: String,
    pub files: CardFiles,
}

/// Typed view of a stored item. The record shape is picked by the app owning the database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Item {
    Ticket(HelpDeskTicket),
    Card(BoardCard),
}

impl Item {
    pub fn from_document(app: App, document: Document) -> Result<Item, serde_json::Error> {
        let value = Value::Object(document);

        match app {
            App::HelpDesk => Ok(Item::Ticket(serde_json::from_value(value)?)),
            App::LikeATrello => Ok(Item::Card(serde_json::from_value(value)?)),
        }
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match self {
            Item::Ticket(ticket) => to_document(ticket),
            Item::Card(card) => to_document(card),
        }
    }
}

fn to_document<T: Serialize>(model: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(model)? {
        Value::Object(document) => Ok(document),
        other => Err(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        ))),
    }
}
