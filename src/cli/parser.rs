use crate::core::export::ExportFormat;
use clap::{Args, Parser, Subcommand};

/// Command-line interface for rAttendance:
/// attendance records, pay periods, finalize and unlock.
#[derive(Parser, Debug)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Attendance record lifecycle and pay-period finalization on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Operator id recorded in the audit trail (defaults to config `operator`)
    #[arg(global = true, long = "actor")]
    pub actor: Option<String>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(global = true, long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity check)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,
    },

    /// Print the audit trail
    Log {
        #[arg(long = "print", help = "Print audit trail entries")]
        print: bool,

        #[arg(long = "period", value_name = "ID", conflicts_with = "record")]
        period: Option<i64>,

        #[arg(long = "record", value_name = "ID")]
        record: Option<i64>,
    },

    /// Store one raw time-clock record
    Ingest(IngestArgs),

    /// Create, show or list pay periods
    Period {
        #[command(subcommand)]
        action: PeriodAction,
    },

    /// Check whether a date range can be finalized
    Validate {
        /// First day (YYYY-MM-DD)
        start: String,
        /// Last day, inclusive (YYYY-MM-DD)
        end: String,
    },

    /// Record, employee and issue counts for a date range
    Summary {
        start: String,
        end: String,
    },

    /// Finalize a PENDING period and lock its records
    Finalize {
        /// Period id
        id: i64,
    },

    /// Reopen a FINALIZED period
    Unlock {
        /// Period id
        id: i64,

        #[arg(long = "reason", help = "Why the period is reopened (required)")]
        reason: String,
    },

    /// Correct a record's date or clock times
    Edit(EditArgs),

    /// Accept or reject a flagged record
    Resolve {
        /// Record id
        id: i64,

        #[arg(long = "accept", conflicts_with = "reject", required_unless_present = "reject")]
        accept: bool,

        #[arg(long = "reject")]
        reject: bool,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// Export a finalized period for payroll
    Export {
        /// Period id
        id: i64,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PeriodAction {
    /// Create a PENDING period and attach unassigned records in range
    Create { start: String, end: String },

    /// Show one period
    Show {
        id: i64,

        #[arg(long = "records", help = "Also list the period's records")]
        records: bool,
    },

    /// List all periods
    List,
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Employee id
    pub employee: String,

    /// Date of the record (YYYY-MM-DD)
    pub date: String,

    #[arg(long = "tx", help = "Originating transaction id")]
    pub transaction: String,

    #[arg(long = "in", help = "Clock-in time (HH:MM)")]
    pub clock_in: Option<String>,

    #[arg(long = "out", help = "Clock-out time (HH:MM)")]
    pub clock_out: Option<String>,

    #[arg(
        long = "conflict",
        default_value = "unresolved",
        help = "Conflict state: unresolved, rejected or resolved"
    )]
    pub conflict: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Record id
    pub id: i64,

    #[arg(long = "date", help = "New date (YYYY-MM-DD); defaults to the current one")]
    pub date: Option<String>,

    #[arg(long = "in", help = "Clock-in time (HH:MM)")]
    pub clock_in: Option<String>,

    #[arg(long = "out", help = "Clock-out time (HH:MM)")]
    pub clock_out: Option<String>,

    #[arg(long = "reason", default_value = "", help = "Reason for the change")]
    pub reason: String,
}
