//! Clap derive structures for the `nimbra` CLI.
//!
//! Parameters that come from a workflow script are taken as raw strings:
//! both `value` and the script list form `["value"]` are accepted, and
//! `-1` marks an unset optional value.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nimbra -- reserve and manage Nimbra Vision circuits
#[derive(Debug, Parser)]
#[command(
    name = "nimbra",
    version,
    about = "Reserve and manage Nimbra Vision circuits from the command line",
    long_about = "Drives circuit reservations through their approval workflow and\n\
        manages live circuits on a Nimbra Vision element behind a gateway.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "NIMBRA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long, short = 'g', env = "NIMBRA_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Nimbra Vision element name (overrides profile)
    #[arg(long, short = 'e', env = "NIMBRA_ELEMENT", global = true)]
    pub element: Option<String>,

    /// Gateway bearer token
    #[arg(long, env = "NIMBRA_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Reservation store file (overrides profile)
    #[arg(long, env = "NIMBRA_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NIMBRA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NIMBRA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NIMBRA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Source,
    Destination,
}

impl From<DirectionArg> for nimbra_core::Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Source => Self::Source,
            DirectionArg::Destination => Self::Destination,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the element and its state
    Element,

    /// Browse interfaces available for new circuits
    #[command(alias = "if", alias = "i")]
    Interfaces(InterfacesArgs),

    /// Manage live circuits on the element
    #[command(alias = "c")]
    Circuits(CircuitsArgs),

    /// Manage circuit reservations and their workflow
    #[command(alias = "res", alias = "r")]
    Reservations(ReservationsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Interfaces ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List interfaces, optionally filtered for a circuit type and end
    #[command(alias = "ls")]
    List {
        /// Circuit type (label, short id or workflow code)
        #[arg(long = "type", short = 't', requires = "direction")]
        circuit_type: Option<String>,

        /// Circuit end the interface is picked for
        #[arg(long, short = 'd', requires = "circuit_type")]
        direction: Option<DirectionArg>,

        /// Only interfaces on this node
        #[arg(long, short = 'n')]
        node: Option<String>,
    },

    /// List nodes with interfaces available for a circuit type and end
    Nodes {
        /// Circuit type (label, short id or workflow code)
        #[arg(long = "type", short = 't')]
        circuit_type: String,

        /// Circuit end the node is picked for
        #[arg(long, short = 'd')]
        direction: DirectionArg,
    },

    /// Translate a raw interface id into its circuit name
    Translate {
        /// Interface family: ets, its or va
        family: String,

        /// Raw interface id
        id: String,
    },
}

// ── Circuits ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CircuitsArgs {
    #[command(subcommand)]
    pub command: CircuitsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CircuitsCommand {
    /// List live circuits
    #[command(alias = "ls")]
    List,

    /// Request a new circuit
    Create(CreateCircuitArgs),

    /// Delete a circuit by its key
    #[command(alias = "rm")]
    Delete {
        /// Circuit key
        key: String,
    },

    /// End a circuit one minute from now
    Stop {
        /// Circuit key
        key: String,
    },

    /// Delete every circuit with an end on the given interface
    PurgeInterface {
        /// Interface circuit name (e.g. `1_nodeA`)
        circuit_name: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateCircuitArgs {
    /// Circuit type (label, short id or workflow code)
    pub circuit_type: String,

    /// Source interface circuit name
    #[arg(long, short = 's')]
    pub source: String,

    /// Destination interface circuit name
    #[arg(long, short = 'd')]
    pub destination: String,

    /// Capacity in Mbps
    #[arg(long, short = 'c')]
    pub capacity: String,

    /// Start time (yyyy-MM-ddTHH:mm:ssZ, -1 for immediate)
    #[arg(long, allow_hyphen_values = true)]
    pub start: Option<String>,

    /// End time (yyyy-MM-ddTHH:mm:ssZ, -1 for open-ended)
    #[arg(long, allow_hyphen_values = true)]
    pub end: Option<String>,

    /// VLAN id (E-Line VLAN)
    #[arg(long)]
    pub vlan: Option<String>,

    /// Form name (E-Line VLAN)
    #[arg(long)]
    pub form_name: Option<String>,

    #[command(flatten)]
    pub srt: SrtArgs,
}

#[derive(Debug, Args)]
pub struct SrtArgs {
    /// SRT stream port (SDI SRT)
    #[arg(long)]
    pub port: Option<String>,

    /// SRT mode: push, pull, rendezvous or a dialog label (SDI SRT)
    #[arg(long)]
    pub mode: Option<String>,

    /// SRT passphrase, at least 10 characters (-1 for none)
    #[arg(long, allow_hyphen_values = true)]
    pub passphrase: Option<String>,
}

// ── Reservations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List reservations, ordered by start time
    #[command(alias = "ls")]
    List {
        /// Only reservations in this status
        #[arg(long, short = 's')]
        status: Option<String>,
    },

    /// Show one reservation
    Show {
        /// Reservation id
        id: String,
    },

    /// Create a draft reservation
    Create(CreateReservationArgs),

    /// Choose interfaces and submit the draft for approval
    Select(SelectArgs),

    /// Approve: create the circuit and wait for the element to confirm it
    Approve {
        /// Reservation id
        id: String,
    },

    /// Reject a reservation waiting for approval
    Reject {
        /// Reservation id
        id: String,
    },

    /// Delete the running circuit and complete the reservation
    Terminate {
        /// Reservation id
        id: String,
    },

    /// Delete the scheduled circuit and cancel the reservation
    Cancel {
        /// Reservation id
        id: String,
    },

    /// Run a workflow action by name
    Action {
        /// Reservation id
        id: String,

        /// Select Interfaces, Approve, Reject, Terminate or Cancel
        action: String,

        #[command(flatten)]
        selection: OptionalSelection,
    },

    /// Apply time-driven transitions (start and end of reservations)
    Sweep,

    /// Remove a reservation, deleting its circuit if still active
    Purge {
        /// Reservation id
        id: String,
    },

    /// Read one workflow field of a reservation
    GetField {
        /// Reservation id
        id: String,

        /// Field name, e.g. "Source Interface"
        field: String,
    },

    /// Write one workflow field of a reservation
    SetField {
        /// Reservation id
        id: String,

        /// Field name, e.g. "Circuit Notes"
        field: String,

        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateReservationArgs {
    /// Circuit type (label, short id or workflow code)
    #[arg(long = "type", short = 't')]
    pub circuit_type: String,

    /// Capacity in Mbps (defaults per circuit type)
    #[arg(long, short = 'c', allow_hyphen_values = true)]
    pub capacity: Option<String>,

    /// Start time (yyyy-MM-ddTHH:mm:ssZ)
    #[arg(long)]
    pub start: String,

    /// End time (yyyy-MM-ddTHH:mm:ssZ)
    #[arg(long)]
    pub end: String,

    /// VLAN id (E-Line VLAN)
    #[arg(long)]
    pub vlan: Option<String>,

    #[command(flatten)]
    pub srt: SrtArgs,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Reservation id
    pub id: String,

    /// Source interface id
    #[arg(long)]
    pub source: String,

    /// Destination interface id
    #[arg(long)]
    pub destination: String,

    /// Source node name
    #[arg(long)]
    pub source_node: String,

    /// Destination node name
    #[arg(long)]
    pub destination_node: String,
}

#[derive(Debug, Args)]
pub struct OptionalSelection {
    /// Source interface id (Select Interfaces)
    #[arg(long)]
    pub source: Option<String>,

    /// Destination interface id (Select Interfaces)
    #[arg(long)]
    pub destination: Option<String>,

    /// Source node name (Select Interfaces)
    #[arg(long)]
    pub source_node: Option<String>,

    /// Destination node name (Select Interfaces)
    #[arg(long)]
    pub destination_node: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store the gateway token in the system keyring
    SetToken {
        /// Profile to store the token for (defaults to the active one)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
