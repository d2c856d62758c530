use chrono::{DateTime, Utc};
use shop_common::EntityKind;

use super::{Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// A customer account; e-mail is the natural key
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: String,
    pub state: String,
    pub street_address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub traffic_source: String,
    /// Store default (`now()`) when absent
    pub created_at: Option<DateTime<Utc>>,
}

impl EntitySchema for User {
    const KIND: EntityKind = EntityKind::User;
    const SOURCE_FILE: &'static str = "users.csv";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "age",
        "gender",
        "state",
        "street_address",
        "postal_code",
        "city",
        "country",
        "latitude",
        "longitude",
        "traffic_source",
    ];

    fn decode(row: &Row) -> Result<Self, ValidationError> {
        let fields = Fields::new(row);

        let email = fields.required_text("email")?;
        if !email.contains('@') {
            return Err(ValidationError::Invalid {
                field: "email",
                reason: format!("'{}' is not an e-mail address", email),
            });
        }

        let age = fields
            .optional_integer("age")?
            .map(|age| coerce::non_negative_count("age", age))
            .transpose()?;

        Ok(Self {
            id: fields.optional_integer("id")?,
            first_name: fields.text("first_name"),
            last_name: fields.text("last_name"),
            email,
            age,
            gender: fields.text("gender"),
            state: fields.text("state"),
            street_address: fields.text("street_address"),
            postal_code: fields.text("postal_code"),
            city: fields.text("city"),
            country: fields.text("country"),
            latitude: coerce::latitude("latitude", fields.number("latitude")?)?,
            longitude: coerce::longitude("longitude", fields.number("longitude")?)?,
            traffic_source: fields.text("traffic_source"),
            created_at: fields.optional_timestamp("created_at")?,
        })
    }

    fn natural_key(&self) -> String {
        self.email.clone()
    }

    fn into_entity(self) -> Entity {
        Entity::User(self)
    }
}
