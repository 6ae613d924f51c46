use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabula::cli::{self, DumpFormat};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Inspect spreadsheets the way tabula imports them")]
#[command(long_about = "Tabula - typed records <-> spreadsheets

COMMANDS:
  sheets  - List the sheets of a workbook
  dump    - Import a sheet as dynamic rows and print JSON/YAML
  column  - Convert a column index to letters or letters to an index

EXAMPLES:
  tabula sheets report.xlsx
  tabula dump report.xlsx --sheet People --skip 1 --format yaml
  tabula column 115        # 115 → DL
  tabula column ACM        # ACM → 766

Set RUST_LOG=tabula=debug for import diagnostics.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sheet names in workbook order
    Sheets {
        /// Path to an xlsx/xls/ods workbook
        file: PathBuf,
    },

    #[command(long_about = "Import one sheet as dynamic rows.

The first row after --skip is the header row. Rows whose first cell is blank
are left out, exactly as typed imports do. Values come back as they are stored
in the workbook (numbers, text, booleans, blanks as null).

A YAML config file can supply the sheet name, skip count and header renames:

  import:
    sheet_name: People
    skip_rows: 1

--sheet and --skip override the config file.")]
    /// Import a sheet and print its rows
    Dump {
        /// Path to an xlsx/xls/ods workbook
        file: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Banner rows above the header row
        #[arg(long)]
        skip: Option<usize>,

        /// YAML options file
        #[arg(short, long, env = "TABULA_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
    },

    /// Convert between column index (0-based) and column letters
    Column {
        /// Index such as 26, or letters such as AA
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabula=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { file } => cli::sheets(file)?,

        Commands::Dump {
            file,
            sheet,
            skip,
            config,
            format,
        } => cli::dump(file, sheet, skip, config, format)?,

        Commands::Column { value } => cli::column(value)?,
    }

    Ok(())
}
