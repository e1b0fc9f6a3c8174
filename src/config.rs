//! Configuration handling for tabslim

use std::path::PathBuf;

/// Output format for table reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Text encoding of delimited input files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, invalid sequences replaced
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character
    Latin1,
}

impl TextEncoding {
    /// Decode one raw field
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "utf8" => Ok(TextEncoding::Utf8),
            "latin1" | "iso88591" => Ok(TextEncoding::Latin1),
            _ => Err(format!("Unknown encoding: {}", s)),
        }
    }
}

/// Row filter keeping rows whose column equals a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

impl std::str::FromStr for RowFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((column, value)) if !column.is_empty() => Ok(RowFilter {
                column: column.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("Expected COLUMN=VALUE, got: {}", s)),
        }
    }
}

/// Configuration for a load-and-slim run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the input file
    pub input_file: PathBuf,
    /// Rows to keep before optimizing
    pub filter: Option<RowFilter>,
    /// Columns parsed as dates or datetimes
    pub parse_dates: Vec<String>,
    /// Encoding of CSV input
    pub encoding: TextEncoding,
    /// Output format
    pub output_format: OutputFormat,
    /// Single-line JSON instead of pretty-printed
    pub compact: bool,
    /// Number of rows to preview after processing
    pub head: usize,
    /// Narrow column storage
    pub optimize: bool,
    /// Normalize column labels
    pub normalize: bool,
    /// Keep colliding labels instead of failing
    pub allow_duplicate_labels: bool,
    /// Print process memory usage at the end
    pub show_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            filter: None,
            parse_dates: Vec::new(),
            encoding: TextEncoding::default(),
            output_format: OutputFormat::default(),
            compact: false,
            head: 0,
            optimize: true,
            normalize: true,
            allow_duplicate_labels: false,
            show_memory: false,
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Keep only rows where `column` equals `value`
    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(RowFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Set columns to parse as dates
    pub fn with_parse_dates(mut self, columns: Vec<String>) -> Self {
        self.parse_dates = columns;
        self
    }

    /// Set input encoding
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Write JSON on a single line
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Preview the first `rows` rows
    pub fn with_head(mut self, rows: usize) -> Self {
        self.head = rows;
        self
    }

    /// Enable or disable storage narrowing
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Enable or disable label normalization
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Allow labels that collide after normalization
    pub fn with_allow_duplicate_labels(mut self, allow: bool) -> Self {
        self.allow_duplicate_labels = allow;
        self
    }

    /// Print process memory usage
    pub fn with_show_memory(mut self, show: bool) -> Self {
        self.show_memory = show;
        self
    }

    /// Whether `column` was requested as a date column
    pub fn is_date_column(&self, column: &str) -> bool {
        self.parse_dates.iter().any(|c| c == column)
    }
}
