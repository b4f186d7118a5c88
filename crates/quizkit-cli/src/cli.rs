//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use quizkit_model::QuestionType;

#[derive(Parser)]
#[command(
    name = "quizkit",
    version,
    about = "Edit paged quiz documents and exchange them as ZIP archives",
    long_about = "Edit paged quiz documents stored in a workspace directory.\n\n\
                  Only the current page is loaded while editing. Whole quizzes are\n\
                  exported to and imported from portable ZIP archives."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Workspace directory (default: from settings, else the platform data
    /// directory).
    #[arg(long = "workspace", short = 'w', value_name = "DIR", global = true)]
    pub workspace: Option<PathBuf>,

    /// Settings file to use instead of the platform config file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the quiz name, limits, and page summary.
    Info,

    /// Set the quiz name.
    Name { name: String },

    /// Set the quiz description.
    Description { text: String },

    /// Set or clear the time limit.
    TimeLimit(TimeLimitArgs),

    /// Manage pages.
    #[command(subcommand)]
    Page(PageCommand),

    /// Edit questions on the current page.
    #[command(subcommand)]
    Question(QuestionCommand),

    /// Edit the options of a select question.
    #[command(subcommand)]
    Option(OptionCommand),

    /// Toggle or set the correct answer of a question.
    ///
    /// For select questions VALUE is an option id; for fill-in-the-blank it
    /// is the answer text. An empty text clears the answer.
    Answer {
        #[arg(value_name = "QUESTION")]
        question: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Print the quiz or one page as JSON. Images are replaced by a
    /// placeholder.
    Preview {
        #[arg(long = "page", value_name = "ID")]
        page: Option<String>,
    },

    /// Write the quiz to a ZIP archive.
    Export {
        /// Output file (default: derived from the quiz name).
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Replace the quiz with the contents of a ZIP archive.
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Args)]
#[group(multiple = false)]
pub struct TimeLimitArgs {
    /// Minutes for the whole quiz.
    #[arg(long = "global", value_name = "MINUTES")]
    pub global: Option<u32>,

    /// Minutes for each page.
    #[arg(long = "per-page", value_name = "MINUTES")]
    pub per_page: Option<u32>,
}

#[derive(Subcommand)]
pub enum PageCommand {
    /// List pages in order.
    List,

    /// Append a page and make it current.
    Add {
        /// Page title (default: "Page N").
        title: Option<String>,
    },

    /// Delete a page with its questions.
    Delete { id: String },

    Rename {
        id: String,
        title: String,
    },

    /// Make a page current.
    Switch { id: String },

    /// Move page SOURCE to the position of page TARGET.
    Move {
        source: String,
        target: String,
    },
}

#[derive(Subcommand)]
pub enum QuestionCommand {
    /// List questions on the current page with their options and answers.
    List,

    /// Add a question to the current page.
    Add {
        /// Question type: single, multi, or fill (default: from settings).
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: Option<QuestionType>,
        /// Question text (default: "Question N").
        text: Option<String>,
    },

    /// Replace a question's text.
    Text {
        id: String,
        text: String,
    },

    /// Change a question's type.
    Type {
        id: String,
        #[arg(value_name = "TYPE")]
        kind: QuestionType,
    },

    Delete { id: String },

    /// Move question SOURCE to the position of question TARGET.
    Move {
        source: String,
        #[arg(required_unless_present = "to_page")]
        target: Option<String>,
        /// Move to another page instead (not supported).
        #[arg(long = "to-page", value_name = "PAGE", conflicts_with = "target")]
        to_page: Option<String>,
    },

    /// Attach an image file to a question.
    Image {
        id: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove a question's image.
    ClearImage { id: String },
}

#[derive(Subcommand)]
pub enum OptionCommand {
    /// Append an option.
    Add {
        question: String,
        text: String,
    },

    Text {
        question: String,
        option: String,
        text: String,
    },

    /// Delete an option. Select questions keep at least two.
    Delete {
        question: String,
        option: String,
    },

    /// Move option SOURCE to the position of option TARGET.
    Move {
        question: String,
        source: String,
        target: String,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
