use shop_common::EntityKind;

use super::{Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// A warehouse products ship from
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionCenter {
    pub id: Option<i32>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl EntitySchema for DistributionCenter {
    const KIND: EntityKind = EntityKind::DistributionCenter;
    const SOURCE_FILE: &'static str = "distribution_centers.csv";
    const COLUMNS: &'static [&'static str] = &["name", "latitude", "longitude"];

    fn decode(row: &Row) -> Result<Self, ValidationError> {
        let fields = Fields::new(row);

        Ok(Self {
            id: fields.optional_integer("id")?,
            name: fields.required_text("name")?,
            latitude: coerce::latitude("latitude", fields.number("latitude")?)?,
            longitude: coerce::longitude("longitude", fields.number("longitude")?)?,
        })
    }

    fn natural_key(&self) -> String {
        self.name.clone()
    }

    fn into_entity(self) -> Entity {
        Entity::DistributionCenter(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_and_without_id() {
        let row = Row::from_pairs(
            1,
            [("id", "1"), ("name", "Memphis TN"), ("latitude", "35.1174"), ("longitude", "-89.9711")],
        );
        let center = DistributionCenter::decode(&row).unwrap();
        assert_eq!(center.id, Some(1));
        assert_eq!(center.natural_key(), "Memphis TN");

        let row = Row::from_pairs(1, [("name", "Chicago IL"), ("latitude", "41.8369"), ("longitude", "-87.6847")]);
        assert_eq!(DistributionCenter::decode(&row).unwrap().id, None);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let row = Row::from_pairs(1, [("name", ""), ("latitude", "0"), ("longitude", "0")]);
        assert_eq!(
            DistributionCenter::decode(&row),
            Err(ValidationError::MissingField { field: "name" })
        );
    }

    #[test]
    fn test_coordinates_are_range_checked() {
        let row = Row::from_pairs(1, [("name", "Nowhere"), ("latitude", "120"), ("longitude", "0")]);
        assert!(matches!(
            DistributionCenter::decode(&row),
            Err(ValidationError::OutOfRange { field: "latitude", .. })
        ));
    }
}
