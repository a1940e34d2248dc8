use polars::prelude::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

use crate::domain::CtError;
use crate::record::{FieldKey, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileType {
    CSV,
    JSON,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    file_type: FileType,
}

/// Records loaded from one file.
#[derive(Debug)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
    pub fields: Vec<FieldKey>,
}

// One schema column converted to cell values, row aligned.
struct LoadedColumn {
    field: FieldKey,
    cells: Vec<Option<Value>>,
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path) -> Result<Dataset, CtError> {
    let file_info = get_file_info(path.to_path_buf())?;
    debug!("Loading {:?} ({} bytes)", file_info.file_type, file_info.file_size);

    let df = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?.collect()?,
        FileType::PARQUET => load_parquet(&file_info.path)?.collect()?,
        FileType::ARROW => load_arrow(&file_info.path)?.collect()?,
        FileType::JSON => load_json(&file_info.path)?,
    };

    let start_time = Instant::now();
    let records = records_from_frame(&df)?;
    info!(
        "Converted {} records in {}ms",
        records.len(),
        start_time.elapsed().as_millis()
    );

    let fields = FieldKey::ALL
        .into_iter()
        .filter(|f| df.column(f.name()).is_ok())
        .collect();

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();

    Ok(Dataset {
        name,
        records,
        fields,
    })
}

/// Converts every column named after a `FieldKey` into record values.
/// Columns are converted in parallel, other columns are skipped.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<Record>, CtError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let columns = names
        .par_iter()
        .filter_map(|name| match name.parse::<FieldKey>() {
            Ok(field) => Some(load_column(df, field)),
            Err(_) => {
                debug!("Ignoring column \"{name}\"");
                None
            }
        })
        .collect::<Result<Vec<LoadedColumn>, PolarsError>>()?;

    let mut records = vec![Record::new(); df.height()];
    for column in columns {
        for (record, cell) in records.iter_mut().zip(column.cells) {
            if let Some(value) = cell {
                record.insert(column.field, value);
            }
        }
    }
    Ok(records)
}

fn load_column(df: &DataFrame, field: FieldKey) -> Result<LoadedColumn, PolarsError> {
    let col = df.column(field.name())?;
    let dtype = col.dtype().clone();
    trace!("Column {field}: {dtype:?}");

    let cells = if is_numeric_type(&dtype) {
        let col = col.cast(&DataType::Float64)?;
        col.f64()?.into_iter().map(|v| v.map(Value::Number)).collect()
    } else {
        let col = col.cast(&DataType::String)?;
        col.str()?
            .into_iter()
            .map(|v| v.map(|s| Value::Text(s.to_string())))
            .collect()
    };

    Ok(LoadedColumn { field, cells })
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn detect_file_type(path: &Path) -> Result<FileType, CtError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("JSON") => Ok(FileType::JSON),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(CtError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, CtError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CtError::FileNotFound,
        ErrorKind::PermissionDenied => CtError::PermissionDenied,
        _ => CtError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(CtError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_json(path: &Path) -> Result<DataFrame, CtError> {
    let file = File::open(path)?;
    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()?;
    Ok(df)
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
