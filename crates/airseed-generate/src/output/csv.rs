use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use airseed_core::{
    Airline, Airport, EntityKind, Favorite, Flight, OutputBatch, TIMESTAMP_FORMAT, Ticket, User,
};

/// Entity that can be written as one CSV row.
pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

impl CsvRecord for Airport {
    const HEADER: &'static [&'static str] = &["id", "city", "country"];

    fn record(&self) -> Vec<String> {
        vec![self.id.clone(), self.city.clone(), self.country.clone()]
    }
}

impl CsvRecord for Airline {
    const HEADER: &'static [&'static str] = &["id", "name", "website"];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.website.clone().unwrap_or_default(),
        ]
    }
}

impl CsvRecord for User {
    const HEADER: &'static [&'static str] = &["id", "password"];

    fn record(&self) -> Vec<String> {
        vec![self.id.clone(), self.password.clone()]
    }
}

impl CsvRecord for Flight {
    const HEADER: &'static [&'static str] = &[
        "id",
        "airline_id",
        "departure_airport_id",
        "arrival_airport_id",
        "departure_time",
        "arrival_time",
        "seat_capacity",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.airline_id.clone(),
            self.departure_airport_id.clone(),
            self.arrival_airport_id.clone(),
            self.departure_time.format(TIMESTAMP_FORMAT).to_string(),
            self.arrival_time.format(TIMESTAMP_FORMAT).to_string(),
            self.seat_capacity.to_string(),
        ]
    }
}

impl CsvRecord for Ticket {
    const HEADER: &'static [&'static str] = &[
        "code",
        "flight_id",
        "airline_id",
        "fare_class",
        "price",
        "availability",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.flight_id.clone(),
            self.airline_id.clone(),
            self.fare_class.as_str().to_string(),
            self.price.to_string(),
            self.availability.to_string(),
        ]
    }
}

impl CsvRecord for Favorite {
    const HEADER: &'static [&'static str] = &["ticket_code", "flight_id", "airline_id", "user_id"];

    fn record(&self) -> Vec<String> {
        vec![
            self.ticket_code.clone(),
            self.flight_id.clone(),
            self.airline_id.clone(),
            self.user_id.clone(),
        ]
    }
}

/// One CSV file written for a run.
#[derive(Debug, Clone)]
pub struct CsvArtifact {
    pub kind: EntityKind,
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
}

/// Write every entity set of `batch` to `<table>.csv` inside `dir`, in insert order.
pub fn write_batch_csv(dir: &Path, batch: &OutputBatch) -> Result<Vec<CsvArtifact>, csv::Error> {
    let mut artifacts = Vec::with_capacity(EntityKind::ORDERED.len());
    for kind in EntityKind::ORDERED {
        let path = dir.join(format!("{}.csv", kind.table_name()));
        let bytes = match kind {
            EntityKind::Airport => write_table_csv(&path, &batch.airports)?,
            EntityKind::Airline => write_table_csv(&path, &batch.airlines)?,
            EntityKind::User => write_table_csv(&path, &batch.users)?,
            EntityKind::Flight => write_table_csv(&path, &batch.flights)?,
            EntityKind::Ticket => write_table_csv(&path, &batch.tickets)?,
            EntityKind::Favorite => write_table_csv(&path, &batch.favorites)?,
        };
        artifacts.push(CsvArtifact {
            kind,
            path,
            rows: batch.len_of(kind) as u64,
            bytes,
        });
    }
    Ok(artifacts)
}

/// Write rows with a header line. Returns the number of bytes written.
pub fn write_table_csv<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
