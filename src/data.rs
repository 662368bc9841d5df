use serde::Deserialize;
use uuid::Uuid;

pub mod directory;
pub mod student;

#[derive(Deserialize)]
pub struct IdForm {
    pub id: Uuid,
}

#[derive(Deserialize)]
pub struct OptionalIdForm {
    pub id: Option<Uuid>,
}
