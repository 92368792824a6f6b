use super::*;

pub mod audit;
pub mod cache;
pub mod convert;
pub mod download;
pub mod init;
pub mod list;
pub mod remove;
pub mod search;
pub mod status;
pub mod tag;

pub use audit::audit;
pub use cache::{cache, CacheCommands};
pub use convert::{convert, ConvertOptions};
pub use download::download;
pub use init::init;
pub use list::{list, show, ListOptions};
pub use remove::remove;
pub use search::{search, SearchOptions};
pub use status::{flag, transition, Flag};
pub use tag::{tag, TagCommands};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a configuration file and create the paper collections
  Init,

  /// Search arXiv
  Search(SearchOptions),

  /// Download a paper from arXiv into the unread collection
  Download {
    /// arXiv identifier, e.g. "2301.07041"
    identifier: String,
  },

  /// List stored papers
  List(ListOptions),

  /// Show the details of a stored paper
  Show {
    /// Paper identifier
    identifier: String,
  },

  /// Move a paper to the read collection
  Read {
    /// Paper identifier
    identifier: String,
  },

  /// Move a paper back to the unread collection
  Unread {
    /// Paper identifier
    identifier: String,
  },

  /// Delete a paper and its PDF after confirmation
  Remove {
    /// Paper identifier
    identifier: String,
  },

  /// Star a paper
  Star {
    /// Paper identifier
    identifier: String,
  },

  /// Remove the star from a paper
  Unstar {
    /// Paper identifier
    identifier: String,
  },

  /// Archive a paper
  Archive {
    /// Paper identifier
    identifier: String,
  },

  /// Un-archive a paper
  Unarchive {
    /// Paper identifier
    identifier: String,
  },

  /// Add or remove tags
  Tag {
    /// The tag operation to run
    #[command(subcommand)]
    cmd: TagCommands,
  },

  /// Convert a PDF to Markdown
  Convert(ConvertOptions),

  /// Inspect or clean the conversion cache
  Cache {
    /// The cache operation to run
    #[command(subcommand)]
    cmd: CacheCommands,
  },

  /// Check metadata against the PDFs on disk
  Audit,
}
