use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dart_lint_fixer::batch::{
    run_with, BatchOptions, BatchReport, FailurePolicy, FileEvent, WritePolicy,
};
use dart_lint_fixer::discover::{DEFAULT_EXTENSION, DEFAULT_SOURCE_DIR};
use dart_lint_fixer::rewrite::RuleHit;
use dart_lint_fixer::rules::{load_from_path, Metadata, RuleSet};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dart-lint-fixer")]
#[command(
    about = "Rewrite Flutter sources to fix prefer_const_constructors and withOpacity deprecations",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Defaults to `fix` with default options
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every source file in place
    Fix {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        rules: RuleArgs,

        /// Only write files whose content changed
        #[arg(long)]
        only_changed: bool,

        /// Keep going after a file fails, exit non-zero at the end
        #[arg(long)]
        keep_going: bool,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the batch report as JSON instead of status lines
        #[arg(long)]
        json: bool,
    },

    /// Report files that would change, exit 1 if any would
    Check {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        rules: RuleArgs,

        /// Show unified diff of pending changes
        #[arg(short, long)]
        diff: bool,

        /// Print the batch report as JSON instead of status lines
        #[arg(long)]
        json: bool,
    },

    /// List the active rules in application order
    Rules {
        #[command(flatten)]
        rules: RuleArgs,
    },
}

#[derive(Args, Clone)]
struct TargetArgs {
    /// Project root
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Directory under the root to search recursively
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    dir: PathBuf,

    /// File extension to rewrite
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    ext: String,
}

impl Default for TargetArgs {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            ext: DEFAULT_EXTENSION.to_string(),
        }
    }
}

#[derive(Args, Clone, Default)]
struct RuleArgs {
    /// TOML rule file appended after the built-in rules
    #[arg(long = "rules", value_name = "FILE")]
    rule_file: Option<PathBuf>,

    /// Skip the built-in rule table
    #[arg(long)]
    no_builtin: bool,

    /// Only run rules tagged with this lint (repeatable)
    #[arg(long = "lint", value_name = "LINT")]
    lints: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cmd_fix(
            TargetArgs::default(),
            RuleArgs::default(),
            FixFlags::default(),
        ),

        Some(Commands::Fix {
            target,
            rules,
            only_changed,
            keep_going,
            dry_run,
            diff,
            json,
        }) => cmd_fix(
            target,
            rules,
            FixFlags {
                only_changed,
                keep_going,
                dry_run,
                diff,
                json,
            },
        ),

        Some(Commands::Check {
            target,
            rules,
            diff,
            json,
        }) => cmd_check(target, rules, diff, json),

        Some(Commands::Rules { rules }) => cmd_rules(rules),
    }
}

#[derive(Default)]
struct FixFlags {
    only_changed: bool,
    keep_going: bool,
    dry_run: bool,
    diff: bool,
    json: bool,
}

/// Active rules plus the metadata of the `--rules` file, if one was given.
struct ActiveRules {
    rules: RuleSet,
    file_meta: Option<Metadata>,
}

/// Helper: Build the active rule set. Pattern errors and id clashes surface
/// here, before any file is read.
fn build_rules(args: &RuleArgs) -> Result<ActiveRules> {
    let mut rules = if args.no_builtin {
        RuleSet::default()
    } else {
        RuleSet::builtin()?
    };

    let mut file_meta = None;
    if let Some(path) = &args.rule_file {
        let file = load_from_path(path)?;
        rules.extend(file.rules).with_context(|| {
            format!("Rule file {} clashes with an active rule", path.display())
        })?;
        file_meta = Some(file.meta);
    }

    rules.retain_lints(&args.lints);

    if rules.is_empty() {
        anyhow::bail!("No rules selected (check --no-builtin, --rules and --lint)");
    }

    Ok(ActiveRules { rules, file_meta })
}

/// Helper: Path relative to the project root for status lines
fn display_path<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Helper: Show the changed hunks of a file, headed by the rules that fired
fn display_diff(file: &Path, hits: &[RuleHit], original: &str, modified: &str) {
    let fired: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!(
        "{}",
        format!("+++ {} (fixed: {})", file.display(), fired.join(", ")).dimmed()
    );

    let diff = TextDiff::from_lines(original, modified);
    let mut unified = diff.unified_diff();
    unified.context_radius(2);

    for hunk in unified.iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn print_json(report: &BatchReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn cmd_fix(target: TargetArgs, rule_args: RuleArgs, flags: FixFlags) -> Result<()> {
    let rules = build_rules(&rule_args)?.rules;

    let options = BatchOptions {
        source_dir: target.dir.clone(),
        extension: target.ext.clone(),
        write_policy: if flags.only_changed {
            WritePolicy::OnChange
        } else {
            WritePolicy::Always
        },
        failure_policy: if flags.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
        dry_run: flags.dry_run,
    };

    let quiet = flags.json;
    if flags.dry_run && !quiet {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }

    let root = target.root.as_path();
    let report = run_with(root, &rules, &options, |event| match event {
        FileEvent::Started { path } => {
            if !quiet {
                println!("Fixing {}...", display_path(root, path).display());
            }
        }
        FileEvent::Finished {
            outcome,
            before,
            after,
        } => {
            if flags.diff && !quiet && outcome.changed {
                display_diff(
                    display_path(root, &outcome.path),
                    &outcome.hits,
                    before,
                    after,
                );
            }
        }
        FileEvent::Failed { path, error } => {
            if !quiet {
                eprintln!(
                    "{} {}: {}",
                    "✗".red(),
                    display_path(root, path).display(),
                    error
                );
            }
        }
    })?;

    if quiet {
        print_json(&report)?;
    } else if flags.dry_run {
        println!(
            "Checked {} files ({} would change)",
            report.visited,
            format!("{}", report.changed).yellow()
        );
    } else {
        println!("Fixed {} files", report.visited);
        if report.has_failures() {
            eprintln!(
                "{}",
                format!("{} files failed", report.failed.len()).red()
            );
        } else {
            println!("{}", "All fixes applied!".green());
        }
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(target: TargetArgs, rule_args: RuleArgs, show_diff: bool, json: bool) -> Result<()> {
    let rules = build_rules(&rule_args)?.rules;

    let options = BatchOptions {
        source_dir: target.dir.clone(),
        extension: target.ext.clone(),
        write_policy: WritePolicy::OnChange,
        failure_policy: FailurePolicy::Continue,
        dry_run: true,
    };

    let root = target.root.as_path();
    let report = run_with(root, &rules, &options, |event| {
        if json {
            return;
        }
        match event {
            FileEvent::Started { .. } => {}
            FileEvent::Finished {
                outcome,
                before,
                after,
            } => {
                if outcome.changed {
                    let hits: usize = outcome.hits.iter().map(|h| h.count).sum();
                    println!(
                        "{} {}: {} fixes pending",
                        "✗".yellow(),
                        display_path(root, &outcome.path).display(),
                        hits
                    );
                    if show_diff {
                        display_diff(
                            display_path(root, &outcome.path),
                            &outcome.hits,
                            before,
                            after,
                        );
                    }
                }
            }
            FileEvent::Failed { path, error } => {
                eprintln!(
                    "{} {}: {}",
                    "✗".red(),
                    display_path(root, path).display(),
                    error
                );
            }
        }
    })?;

    if json {
        print_json(&report)?;
    } else {
        println!();
        println!("{}", "Summary:".bold());
        println!("  {} checked", report.visited);
        println!("  {} need fixes", format!("{}", report.changed).yellow());
        println!("  {} failed", format!("{}", report.failed.len()).red());
        if report.changed == 0 && !report.has_failures() {
            println!("{} All files clean", "✓".green());
        }
    }

    if report.changed > 0 || report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_rules(rule_args: RuleArgs) -> Result<()> {
    let ActiveRules { rules, file_meta } = build_rules(&rule_args)?;

    if let Some(meta) = file_meta {
        let name = if meta.name.is_empty() {
            "(unnamed)"
        } else {
            meta.name.as_str()
        };
        println!("{} {}", "Rule file:".bold(), name.cyan());
        if let Some(description) = &meta.description {
            println!("  {}", description.dimmed());
        }
    }

    println!("{} ({} rules)", "Active rules".bold(), rules.len());
    for rule in &rules {
        println!(
            "  {} [{}]",
            rule.id().green(),
            rule.lint().unwrap_or("custom").dimmed()
        );
        println!("      {} {}", "pattern:".dimmed(), rule.pattern());
        println!("      {} {}", "replace:".dimmed(), rule.replacement());
    }

    Ok(())
}
