/// Table definitions. Times are stored as `YYYY-MM-DD HH:MM` text and
/// prices as whole currency units.
pub const SCHEMA: &[&str] = &[
    r#"
    create table if not exists airport (
        id      text primary key,
        city    text not null,
        country text not null
    )
    "#,
    r#"
    create table if not exists airline (
        id      text primary key,
        name    text not null,
        website text
    )
    "#,
    r#"
    create table if not exists "user" (
        id       text primary key,
        password text not null
    )
    "#,
    r#"
    create table if not exists flight (
        id                   text primary key,
        airline_id           text not null references airline (id),
        departure_airport_id text not null references airport (id),
        arrival_airport_id   text not null references airport (id),
        departure_time       text not null,
        arrival_time         text not null,
        seat_capacity        integer not null check (seat_capacity >= 0),
        check (departure_airport_id <> arrival_airport_id)
    )
    "#,
    r#"
    create table if not exists ticket (
        code         text not null,
        flight_id    text not null references flight (id),
        airline_id   text not null references airline (id),
        fare_class   text not null check (fare_class in ('economy', 'business', 'first')),
        price        integer not null check (price >= 0),
        availability integer not null check (availability >= 0),
        primary key (code, flight_id, airline_id)
    )
    "#,
    r#"
    create table if not exists favorite (
        ticket_code text not null,
        flight_id   text not null,
        airline_id  text not null,
        user_id     text not null references "user" (id),
        primary key (ticket_code, flight_id, airline_id, user_id),
        foreign key (ticket_code, flight_id, airline_id)
            references ticket (code, flight_id, airline_id)
    )
    "#,
];

pub fn insert_or_ignore_prefix(table: &str, columns: &[&str]) -> String {
    format!(
        "insert or ignore into \"{table}\" ({}) ",
        columns.join(", ")
    )
}
