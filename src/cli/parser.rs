use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rWorklog
#[derive(Parser)]
#[command(
    name = "rworklog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track work orders and engineer time entries with lunch deductions and hour thresholds",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Actor recorded in the audit log (default: config default_engineer, then $USER)
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Override the notification outbox file
    #[arg(global = true, long = "outbox")]
    pub outbox: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "edit", help = "Edit the configuration file (default editor: $EDITOR, or nano)")]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the audit log
    Log {
        #[arg(long = "print", help = "Print rows from the audit log")]
        print: bool,

        #[arg(long = "limit", help = "Only the most recent N rows")]
        limit: Option<usize>,
    },

    /// Work orders
    Wo {
        #[command(subcommand)]
        action: WoAction,
    },

    /// Projects of a work order
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Project tasks and entry assignment
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Log a time entry
    Add {
        #[arg(long = "wo", help = "Work order id")]
        work_order: i64,

        #[arg(long, help = "Engineer name (default: --user / default_engineer)")]
        engineer: Option<String>,

        #[arg(long, help = "Work date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "in", help = "Time in (HH:MM)")]
        time_in: String,

        #[arg(long = "out", help = "Time out (HH:MM); earlier than --in means next day")]
        time_out: String,

        #[arg(long = "lunch-start", requires = "lunch_end")]
        lunch_start: Option<String>,

        #[arg(long = "lunch-end", requires = "lunch_start")]
        lunch_end: Option<String>,

        #[arg(long, help = "Task id to book the hours on")]
        task: Option<i64>,

        #[arg(long, short = 'm', default_value = "")]
        description: String,
    },

    /// Edit an open time entry
    Edit {
        id: i64,

        #[arg(long)]
        engineer: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long = "in")]
        time_in: Option<String>,

        #[arg(long = "out")]
        time_out: Option<String>,

        #[arg(long = "lunch-start", requires = "lunch_end")]
        lunch_start: Option<String>,

        #[arg(long = "lunch-end", requires = "lunch_start")]
        lunch_end: Option<String>,

        #[arg(long = "no-lunch", conflicts_with = "lunch_start", help = "Remove the declared lunch")]
        no_lunch: bool,

        #[arg(long, short = 'm')]
        description: Option<String>,
    },

    /// Set the accounting export flags (either one locks the entry)
    Flags {
        #[arg(required = true, value_delimiter = ',', help = "Entry id(s), comma-separated")]
        ids: Vec<i64>,

        #[arg(long)]
        jl: Option<bool>,

        #[arg(long)]
        jt: Option<bool>,
    },

    /// Delete one entry, or several with --ids
    Del {
        #[arg(required_unless_present = "ids")]
        id: Option<i64>,

        #[arg(long, value_delimiter = ',', conflicts_with = "id")]
        ids: Vec<i64>,
    },

    /// Move entries to another work order
    Reassign {
        #[arg(long = "to", help = "Target work order id")]
        to: i64,

        #[arg(required_unless_present_any = ["ids", "from_wo"])]
        id: Option<i64>,

        #[arg(long, value_delimiter = ',', conflicts_with_all = ["id", "from_wo"])]
        ids: Vec<i64>,

        #[arg(long = "from-wo", conflicts_with = "id", help = "Move every entry of this work order")]
        from_wo: Option<i64>,
    },

    /// List time entries
    List {
        #[arg(long = "wo")]
        work_order: Option<i64>,

        #[arg(long)]
        engineer: Option<String>,

        #[arg(long, help = "Only this date (YYYY-MM-DD); needs --engineer")]
        date: Option<String>,

        #[arg(long)]
        task: Option<i64>,
    },

    /// Submit a timesheet CSV (one transaction per row)
    Timesheet {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        engineer: Option<String>,
    },

    /// Import entries from CSV keyed by job number
    Import {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Weekly (Sunday–Saturday) timesheet view
    Week {
        #[arg(long)]
        engineer: Option<String>,

        #[arg(long, help = "Any date inside the week (default today)")]
        date: Option<String>,

        #[arg(long, value_name = "YYYY-WW", conflicts_with = "date", help = "ISO week")]
        week: Option<String>,
    },

    /// Export time entries
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long = "wo")]
        work_order: Option<i64>,

        #[arg(long, value_name = "RANGE", help = "Filter by year/month/day or a custom range")]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Send scheduled-date reminders due today
    Remind {
        #[arg(long, help = "Reference date (YYYY-MM-DD, default today)")]
        today: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum WoAction {
    /// Create a work order
    Add {
        job_number: String,

        #[arg(long, short = 'm')]
        description: String,

        #[arg(long = "customer-wo")]
        customer_wo: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long, default_value_t = 0.0)]
        estimate: f64,

        #[arg(long, default_value = "medium")]
        priority: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long, help = "Scheduled date (YYYY-MM-DD)")]
        scheduled: Option<String>,

        #[arg(long, default_value = "Billable")]
        classification: String,
    },

    /// List work orders
    List {
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a work order with its hour roll-up
    Show { id: i64 },

    /// Change status (open, complete, closed)
    Status { id: i64, status: String },

    /// Mark a work order approved for work
    Approve {
        id: i64,

        #[arg(long)]
        revoke: bool,
    },

    /// Delete a work order with all its entries
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    Add {
        #[arg(long = "wo")]
        work_order: i64,

        name: String,

        #[arg(long, short = 'm', default_value = "")]
        description: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },

    List {
        #[arg(long = "wo")]
        work_order: i64,
    },

    /// Delete a project and its tasks (entries are detached)
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TaskAction {
    Add {
        #[arg(long)]
        project: i64,

        name: String,

        #[arg(long, default_value_t = 0.0)]
        estimate: f64,

        #[arg(long, default_value = "Medium")]
        priority: String,

        #[arg(long, short = 'm', default_value = "")]
        description: String,

        #[arg(long, default_value = "", help = "Comma-separated task ids")]
        depends: String,

        #[arg(long)]
        assignee: Option<String>,
    },

    List {
        #[arg(long)]
        project: i64,
    },

    /// Set status (not-started, in-progress, completed, delayed)
    Status {
        id: i64,
        status: String,

        #[arg(long)]
        progress: Option<u8>,
    },

    /// Book an entry's hours on a task
    Assign { entry: i64, task: i64 },

    /// Take an entry's hours off a task
    Unassign { entry: i64, task: i64 },

    /// Delete a task; its entries keep their hours
    Del { id: i64 },

    /// Recompute actual hours from linked entries
    Reconcile { id: i64 },
}
