use airseed_core::{EntityKind, OutputBatch, TIMESTAMP_FORMAT};

/// Column value handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Null,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<Option<&str>> for SqlValue {
    fn from(value: Option<&str>) -> Self {
        value.map(SqlValue::from).unwrap_or(SqlValue::Null)
    }
}

pub type Row = Vec<SqlValue>;

/// Column names of each table, in the order [`rows_for`] emits values.
pub fn columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Airport => &["id", "city", "country"],
        EntityKind::Airline => &["id", "name", "website"],
        EntityKind::User => &["id", "password"],
        EntityKind::Flight => &[
            "id",
            "airline_id",
            "departure_airport_id",
            "arrival_airport_id",
            "departure_time",
            "arrival_time",
            "seat_capacity",
        ],
        EntityKind::Ticket => &[
            "code",
            "flight_id",
            "airline_id",
            "fare_class",
            "price",
            "availability",
        ],
        EntityKind::Favorite => &["ticket_code", "flight_id", "airline_id", "user_id"],
    }
}

/// Rows for one table of `batch`.
pub fn rows_for(batch: &OutputBatch, kind: EntityKind) -> Vec<Row> {
    match kind {
        EntityKind::Airport => batch
            .airports
            .iter()
            .map(|a| vec![a.id.as_str().into(), a.city.as_str().into(), a.country.as_str().into()])
            .collect(),
        EntityKind::Airline => batch
            .airlines
            .iter()
            .map(|a| {
                vec![
                    a.id.as_str().into(),
                    a.name.as_str().into(),
                    a.website.as_deref().into(),
                ]
            })
            .collect(),
        EntityKind::User => batch
            .users
            .iter()
            .map(|u| vec![u.id.as_str().into(), u.password.as_str().into()])
            .collect(),
        EntityKind::Flight => batch
            .flights
            .iter()
            .map(|f| {
                vec![
                    f.id.as_str().into(),
                    f.airline_id.as_str().into(),
                    f.departure_airport_id.as_str().into(),
                    f.arrival_airport_id.as_str().into(),
                    SqlValue::Text(f.departure_time.format(TIMESTAMP_FORMAT).to_string()),
                    SqlValue::Text(f.arrival_time.format(TIMESTAMP_FORMAT).to_string()),
                    SqlValue::Int(i64::from(f.seat_capacity)),
                ]
            })
            .collect(),
        EntityKind::Ticket => batch
            .tickets
            .iter()
            .map(|t| {
                vec![
                    t.code.as_str().into(),
                    t.flight_id.as_str().into(),
                    t.airline_id.as_str().into(),
                    t.fare_class.as_str().into(),
                    SqlValue::Int(t.price),
                    SqlValue::Int(i64::from(t.availability)),
                ]
            })
            .collect(),
        EntityKind::Favorite => batch
            .favorites
            .iter()
            .map(|f| {
                vec![
                    f.ticket_code.as_str().into(),
                    f.flight_id.as_str().into(),
                    f.airline_id.as_str().into(),
                    f.user_id.as_str().into(),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use airseed_core::{Airline, FareClass, Ticket};

    use super::*;

    #[test]
    fn rows_match_column_count() {
        let batch = OutputBatch {
            airlines: vec![Airline {
                id: "AB".to_string(),
                name: "Sky Jet".to_string(),
                website: None,
            }],
            ..OutputBatch::default()
        };
        for kind in EntityKind::ORDERED {
            for row in rows_for(&batch, kind) {
                assert_eq!(row.len(), columns(kind).len());
            }
        }
        let rows = rows_for(&batch, EntityKind::Airline);
        assert_eq!(rows[0][2], SqlValue::Null);
    }

    #[test]
    fn prices_and_counts_bind_as_integers() {
        let batch = OutputBatch {
            tickets: vec![Ticket {
                code: "E".to_string(),
                flight_id: "AB0001".to_string(),
                airline_id: "AB".to_string(),
                fare_class: FareClass::Economy,
                price: 120,
                availability: 40,
            }],
            ..OutputBatch::default()
        };
        let rows = rows_for(&batch, EntityKind::Ticket);
        assert_eq!(rows[0][4], SqlValue::Int(120));
        assert_eq!(rows[0][5], SqlValue::Int(40));
        assert_eq!(rows[0][3], SqlValue::Text("economy".to_string()));
    }
}
