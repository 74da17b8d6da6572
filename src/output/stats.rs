//! Statistics reporting.

use console::style;

use crate::download::{DownloadState, GlobalState};

/// Print statistics for a single fanclub or post.
pub fn print_creator_stats(state: &DownloadState) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for {}:", state.label())).bold()
    );
    println!("  Posts:      {}", state.posts_downloaded);
    if state.posts_failed > 0 {
        println!("  Failed:     {}", style(state.posts_failed).red());
    }
    if state.posts_excluded > 0 {
        println!("  Excluded:   {}", state.posts_excluded);
    }
    println!("  Files:      {}", state.files_downloaded);
    println!("  Skipped:    {} (already present)", state.files_skipped);
    if state.restricted_count > 0 {
        println!(
            "  Restricted: {} (not on your plan)",
            style(state.restricted_count).yellow()
        );
    }
    if state.unsupported_count > 0 {
        println!("  Unsupported: {}", state.unsupported_count);
    }
    if state.links_recorded > 0 {
        println!("  Links:      {}", state.links_recorded);
    }
}

/// Print global statistics across all targets.
pub fn print_global_stats(state: &GlobalState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Targets processed: {}", state.targets_processed);
    if state.targets_failed > 0 {
        println!("  Targets failed:    {}", style(state.targets_failed).red());
    }
    println!("  Posts:      {}", state.posts_downloaded);
    if state.posts_failed > 0 {
        println!("  Failed:     {}", style(state.posts_failed).red());
    }
    println!("  Files:      {}", state.files_downloaded);
    println!("  Skipped:    {} (already present)", state.files_skipped);
    println!("  Restricted: {}", state.restricted_count);
    println!("  Links:      {}", state.links_recorded);
    println!("{}", style("═".repeat(50)).dim());
}

/// Print a summary line for quick viewing.
pub fn print_summary(posts: u64, files: u64, skipped: u64) {
    println!(
        "Downloaded: {} posts, {} files ({} skipped)",
        style(posts).green(),
        style(files).green(),
        style(skipped).yellow()
    );
}
