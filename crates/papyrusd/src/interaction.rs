//! Terminal output and prompts.

use dialoguer::{Confirm, Input};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for work in progress
pub static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for a detail line
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last detail line
pub static LAST_ITEM_PREFIX: &str = "└─";
/// Marker for list entries
pub static BULLET: &str = "•";
/// Marker for starred papers
pub static STAR: &str = "★";

/// Something to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Full details of one stored paper
  Paper(&'a LocalPaper),
  /// One line per stored paper
  Papers(&'a [LocalPaper]),
  /// Catalog search results
  Entries(&'a [CatalogEntry]),
  /// An operation completed
  Success(&'a str),
  /// Neutral information
  Info(&'a str),
  /// Something looks off but the command carried on
  Warning(&'a str),
  /// The command failed
  Error(PapyrusdError),
}

/// How commands talk to the user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Asks for a line of text, offering `default`.
  fn prompt(&self, message: &str, default: &str) -> Result<String>;
  /// Shows `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(
      Confirm::new()
        .with_prompt(format!("{}{}", style(PROMPT_PREFIX).cyan(), message))
        .default(false)
        .wait_for_newline(true)
        .interact()?,
    )
  }

  fn prompt(&self, message: &str, default: &str) -> Result<String> {
    if self.accept_defaults {
      return Ok(default.to_string());
    }
    Ok(
      Input::<String>::new()
        .with_prompt(format!("{}{}", style(PROMPT_PREFIX).cyan(), message))
        .default(default.to_string())
        .interact_text()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Paper(paper) => print_paper(paper),
      ResponseContent::Papers(papers) =>
        if papers.is_empty() {
          println!("{}No papers found", style(INFO_PREFIX).blue());
        } else {
          println!("{}Found {} papers:", style(SUCCESS_PREFIX).green(), style(papers.len()).bold());
          for paper in papers {
            print_paper_line(paper);
          }
        },
      ResponseContent::Entries(entries) =>
        if entries.is_empty() {
          println!("{}No results", style(INFO_PREFIX).blue());
        } else {
          for entry in entries {
            print_entry(entry);
          }
        },
      ResponseContent::Success(message) => println!("{}{}", style(SUCCESS_PREFIX).green(), message),
      ResponseContent::Info(message) => println!("{}{}", style(INFO_PREFIX).blue(), message),
      ResponseContent::Warning(message) =>
        println!("{}{}", style(WARNING_PREFIX).yellow(), style(message).yellow()),
      ResponseContent::Error(error) =>
        eprintln!("{}{}", style(ERROR_PREFIX).red(), style(error).red()),
    }
    Ok(())
  }
}

/// Joins author names, shortening long lists.
fn format_authors(authors: &[String]) -> String {
  match authors {
    [] => "Unknown".to_string(),
    [one] => one.clone(),
    [first, second] => format!("{first} and {second}"),
    [first, rest @ ..] => format!("{first} et al. ({} more)", rest.len()),
  }
}

/// Prints one line for a stored paper.
fn print_paper_line(paper: &LocalPaper) {
  let star = if paper.starred { format!(" {}", style(STAR).yellow()) } else { String::new() };
  let archived = if paper.archived { format!(" {}", style("(archived)").dim()) } else { String::new() };
  println!(
    "{} {} {} [{}]{}{}",
    style(BULLET).dim(),
    style(&paper.id).yellow(),
    style(&paper.title).white().bold(),
    style(paper.collection).cyan(),
    star,
    archived
  );
}

/// Prints the full details of a stored paper.
fn print_paper(paper: &LocalPaper) {
  println!("{}Paper details:", style(SUCCESS_PREFIX).green());
  println!("   {} Title: {}", style(ITEM_PREFIX).dim(), style(&paper.title).white().bold());
  println!("   {} Identifier: {}", style(ITEM_PREFIX).dim(), style(&paper.id).yellow());
  println!("   {} Authors: {}", style(ITEM_PREFIX).dim(), format_authors(&paper.authors));
  println!("   {} Collection: {}", style(ITEM_PREFIX).dim(), style(paper.collection).cyan());
  println!(
    "   {} Categories: {} ({})",
    style(ITEM_PREFIX).dim(),
    paper.categories.join(", "),
    style(&paper.primary_category).bold()
  );
  println!("   {} Published: {}", style(ITEM_PREFIX).dim(), paper.published.format("%Y-%m-%d"));
  println!(
    "   {} Downloaded: {}",
    style(ITEM_PREFIX).dim(),
    paper.downloaded_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
  );
  if let Some(doi) = &paper.doi {
    println!("   {} DOI: {}", style(ITEM_PREFIX).dim(), style(doi).blue().underlined());
  }
  if let Some(journal_ref) = &paper.journal_ref {
    println!("   {} Journal: {}", style(ITEM_PREFIX).dim(), journal_ref);
  }
  if !paper.tags.is_empty() {
    println!("   {} Tags: {}", style(ITEM_PREFIX).dim(), paper.tags.as_slice().join(", "));
  }
  if paper.starred || paper.archived {
    let flags: Vec<&str> = [(paper.starred, "starred"), (paper.archived, "archived")]
      .into_iter()
      .filter_map(|(set, name)| set.then_some(name))
      .collect();
    println!("   {} Flags: {}", style(ITEM_PREFIX).dim(), flags.join(", "));
  }
  println!(
    "   {} PDF: {} ({} bytes)",
    style(LAST_ITEM_PREFIX).dim(),
    style(paper.path.display()).dim(),
    paper.file_size
  );
}

/// Prints a catalog search result.
fn print_entry(entry: &CatalogEntry) {
  println!("{} {} {}", style(BULLET).dim(), style(&entry.id).yellow(), style(&entry.title).bold());
  println!("   {} {}", style(ITEM_PREFIX).dim(), format_authors(&entry.authors));
  println!(
    "   {} {} {}",
    style(LAST_ITEM_PREFIX).dim(),
    style(&entry.primary_category).cyan(),
    entry.published.format("%Y-%m-%d")
  );
}
