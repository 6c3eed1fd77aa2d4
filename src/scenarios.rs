use crate::config::DemoConfig;
use crate::dynamic::{DynValue, TypeRegistry};
use crate::fault::{Fault, FaultKind};
use crate::outcome::Report;
use crate::records::{write_records, RecordReader};
use crate::runner::{Catalogue, CatalogueBuilder, CatalogueError, Runner};
use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

pub const READ_MISSING_FILE: &str = "read-missing-file";
pub const OPEN_MISSING_FILE: &str = "open-missing-file";
pub const READ_PAST_END: &str = "read-past-end";
pub const CONNECT_UNREACHABLE_DATABASE: &str = "connect-unreachable-database";
pub const LOAD_UNKNOWN_TYPE: &str = "load-unknown-type";
pub const DIVIDE_BY_ZERO: &str = "divide-by-zero";
pub const DEREFERENCE_ABSENT_VALUE: &str = "dereference-absent-value";
pub const INDEX_OUT_OF_RANGE: &str = "index-out-of-range";
pub const INVALID_TYPE_CAST: &str = "invalid-type-cast";
pub const INVALID_ARGUMENT: &str = "invalid-argument";
pub const MALFORMED_NUMERIC_PARSE: &str = "malformed-numeric-parse";

/// Catalogue order.
pub const SCENARIO_NAMES: [&str; 11] = [
    READ_MISSING_FILE,
    OPEN_MISSING_FILE,
    READ_PAST_END,
    CONNECT_UNREACHABLE_DATABASE,
    LOAD_UNKNOWN_TYPE,
    DIVIDE_BY_ZERO,
    DEREFERENCE_ABSENT_VALUE,
    INDEX_OUT_OF_RANGE,
    INVALID_TYPE_CAST,
    INVALID_ARGUMENT,
    MALFORMED_NUMERIC_PARSE,
];

pub const SAMPLE_RECORDS: [&str; 2] = ["first record", "second record"];

// =============================================================================
// I/O and external resources
// =============================================================================

fn at(path: &Path) -> impl FnOnce(io::Error) -> Fault + '_ {
    move |err| Fault::from(err).context(path.display())
}

/// Open a file and read its first line.
pub fn read_missing_file(path: &Path) -> Result<(), Fault> {
    let file = File::open(path).map_err(at(path))?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).map_err(at(path))?;
    Ok(())
}

/// Only open the file; nothing is read.
pub fn open_missing_file(path: &Path) -> Result<(), Fault> {
    File::open(path).map(drop).map_err(at(path))
}

/// Read records until none are left. Reaching the end is reported as `EndOfStream`.
pub fn read_past_end(path: &Path) -> Result<(), Fault> {
    let file = File::open(path).map_err(at(path))?;
    let mut reader = RecordReader::new(BufReader::new(file));

    loop {
        match reader.next_record() {
            Ok(_) => continue,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                let count = reader.records_read();
                let plural = if count == 1 { "" } else { "s" };
                return Err(Fault::new(
                    FaultKind::EndOfStream,
                    format!("end of file reached after {count} record{plural}"),
                ));
            }
            Err(err) => return Err(at(path)(err)),
        }
    }
}

/// Open an existing SQLite database without permission to create it.
pub fn connect_database(path: &Path, timeout: Duration) -> Result<(), Fault> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| Fault::from(err).context(path.display()))?;

    conn.busy_timeout(timeout)?;
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(())
}

/// Write the sample records to `path` unless something is already there.
/// Returns whether the file was written.
pub fn prepare_records_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_records(File::create(path)?, &SAMPLE_RECORDS)?;
    Ok(true)
}

// =============================================================================
// In-process faults
// =============================================================================

pub fn load_type(registry: &TypeRegistry, name: &str) -> Result<DynValue, Fault> {
    registry.resolve(name)
}

pub fn divide(lhs: i32, rhs: i32) -> Result<i32, Fault> {
    lhs.checked_div(rhs).ok_or_else(|| {
        let message = if rhs == 0 {
            "attempt to divide by zero"
        } else {
            "attempt to divide with overflow"
        };
        Fault::new(FaultKind::InvalidArithmetic, message)
    })
}

pub fn string_length(value: Option<&str>) -> Result<usize, Fault> {
    value.map(str::len).ok_or_else(|| {
        Fault::new(
            FaultKind::NullReference,
            "cannot invoke `len` because the value is absent",
        )
    })
}

pub fn element_at(values: &[i32], index: usize) -> Result<i32, Fault> {
    values.get(index).copied().ok_or_else(|| {
        Fault::new(
            FaultKind::BoundsViolation,
            format!("index {index} out of bounds for length {}", values.len()),
        )
    })
}

pub fn cast<T: 'static>(value: DynValue) -> Result<T, Fault> {
    value.downcast::<T>()
}

/// Sleep for `millis` milliseconds; negative durations are rejected.
pub fn sleep_millis(millis: i64) -> Result<(), Fault> {
    let duration = Duration::try_from_secs_f64(millis as f64 / 1000.0)
        .map_err(|err| Fault::from(err).context(format!("sleep({millis}ms)")))?;
    thread::sleep(duration);
    Ok(())
}

pub fn parse_number(input: &str) -> Result<i32, Fault> {
    input
        .parse()
        .map_err(|err| Fault::from(err).context(format!("for input string \"{input}\"")))
}

// =============================================================================
// Catalogue
// =============================================================================

/// All eleven demonstrations, in the order they are reported.
pub fn standard_catalogue(config: &DemoConfig) -> Result<Catalogue, CatalogueError> {
    let missing = config.missing_path.clone();
    let records = config.records_path.clone();
    let database = config.database_path.clone();
    let timeout = config.connect_timeout();
    let unknown_type = config.unknown_type.clone();
    let registry = TypeRegistry::with_builtins();

    let mut builder = CatalogueBuilder::new();
    {
        let missing = missing.clone();
        builder.register(READ_MISSING_FILE, move || read_missing_file(&missing))?;
    }
    builder
        .register(OPEN_MISSING_FILE, move || open_missing_file(&missing))?
        .register(READ_PAST_END, move || read_past_end(&records))?
        .register(CONNECT_UNREACHABLE_DATABASE, move || {
            connect_database(&database, timeout)
        })?
        .register(LOAD_UNKNOWN_TYPE, move || {
            load_type(&registry, &unknown_type).map(drop)
        })?
        .register(DIVIDE_BY_ZERO, || divide(10, 0).map(drop))?
        .register(DEREFERENCE_ABSENT_VALUE, || string_length(None).map(drop))?
        .register(INDEX_OUT_OF_RANGE, || element_at(&[1, 2, 3], 5).map(drop))?
        .register(INVALID_TYPE_CAST, || {
            cast::<i32>(DynValue::new(String::from("String"))).map(drop)
        })?
        .register(INVALID_ARGUMENT, || sleep_millis(-1000))?
        .register(MALFORMED_NUMERIC_PARSE, || parse_number("invalid").map(drop))?;

    Ok(builder.build())
}

/// Prepare the record fixture, run the standard catalogue and write one line
/// per outcome to `out`. A fixture that cannot be written is only logged:
/// `read-past-end` reports the missing file like any other fault.
pub fn run_demo<W: Write>(config: &DemoConfig, out: &mut W) -> anyhow::Result<Report> {
    match prepare_records_file(&config.records_path) {
        Ok(true) => info!(path = %config.records_path.display(), "wrote record fixture"),
        Ok(false) => {}
        Err(err) => warn!(
            path = %config.records_path.display(),
            error = %err,
            "could not write record fixture"
        ),
    }

    let catalogue = standard_catalogue(config).context("building scenario catalogue")?;
    let report = Runner::new(catalogue).report();

    for outcome in &report.outcomes {
        writeln!(out, "{outcome}").context("writing report line")?;
    }
    Ok(report)
}
