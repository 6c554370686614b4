use crate::error::{ForecastError, Result};
use crate::models::{Channel, ForecastRow};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Columnar export of the forecast table. Measurements are stored as nullable
/// floats; values the decoder printed that are not numbers become nulls.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ForecastError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    pub fn write_rows(&self, rows: &[ForecastRow], path: &Path) -> Result<()> {
        let schema = Self::create_schema();
        let batch = Self::rows_to_batch(rows, schema.clone())?;

        let file = File::create(path).map_err(|e| ForecastError::write(path, e))?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("city", DataType::Utf8, false),
            Field::new("state_name", DataType::Utf8, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("lng", DataType::Float64, false),
            Field::new("population", DataType::UInt64, true),
            Field::new("timezone", DataType::Utf8, false),
            Field::new("validTime", DataType::Utf8, false),
        ];
        fields.extend(
            Channel::ALL
                .iter()
                .map(|c| Field::new(c.field_name(), DataType::Float64, true)),
        );

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(rows: &[ForecastRow], schema: Arc<Schema>) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            text_column(rows.iter().map(|r| r.city.as_str())),
            text_column(rows.iter().map(|r| r.state_name.as_str())),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lat))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lng))),
            Arc::new(UInt64Array::from(
                rows.iter().map(|r| r.population).collect::<Vec<_>>(),
            )),
            text_column(rows.iter().map(|r| r.timezone.as_str())),
            text_column(rows.iter().map(|r| r.valid_time.as_str())),
        ];
        for channel in Channel::ALL {
            let values: Float64Array = rows
                .iter()
                .map(|r| r.measurement(channel).and_then(|v| v.trim().parse::<f64>().ok()))
                .collect();
            columns.push(Arc::new(values));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: metadata.num_row_groups(),
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

fn text_column<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: usize,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
        )
    }
}
