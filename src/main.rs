//! subtidy - Layout formatter for EPICS substitution files

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::Pattern;
use rayon::prelude::*;
use subtidy::process::{format_file, write_backup};
use subtidy::{
    find_directive, parse_args, CliArgs, Config, DiagnosticSink, Result, SilentSink, StderrSink,
};
use walkdir::WalkDir;

/// Substitution file extensions to process
const SUBSTITUTION_EXTENSIONS: &[&str] = &["substitutions", "subs"];

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn main() {
    std::process::exit(run());
}

/// Run the formatter and return the process exit status.
///
/// Status 0 means everything formatted cleanly; status 2 means at least one
/// input failed (warnings alone do not affect the status).
fn run() -> i32 {
    // Parse CLI arguments
    let args = parse_args();

    // Check if we should read from stdin
    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // If no inputs and running interactively, print usage; otherwise read from stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return 0;
    }

    if use_stdin {
        // Process stdin - use current directory for config discovery
        let result = build_config(&args, None).and_then(|config| process_stdin(&config, &args));
        return match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                2
            }
        };
    }

    // Build base configuration for parallel processing
    // For explicit config files, we use one config for all files
    // For auto-discovery, each file may have its own config
    let use_per_file_config = args.config.is_none();
    let base_config = if use_per_file_config {
        None
    } else {
        match build_config(&args, None) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Error: {e}");
                return 2;
            }
        }
    };

    // Configure thread pool if --jobs specified
    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    // Collect all files to process
    let files = collect_files(&args);

    if files.is_empty() {
        if !args.silent {
            eprintln!("No substitution files found to format.");
        }
        return 0;
    }

    // Process files
    let use_sequential = args.stdout || args.jobs == Some(1);
    let errors = if use_sequential {
        // Sequential processing for stdout or --jobs 1
        process_files_sequential(&files, base_config.as_ref(), &args)
    } else {
        // Parallel processing for in-place formatting
        process_files_parallel(&files, base_config.as_ref(), &args)
    };

    if errors == 0 {
        0
    } else {
        2
    }
}

/// Build configuration from CLI args and optional config file
///
/// If `for_path` is provided and no explicit config file is specified,
/// uses auto-discovery to find config files in parent directories.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        // Explicit config file specified
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else if let Some(path) = for_path {
        // Auto-discover config files from parent directories
        if args.debug {
            let discovered = Config::discover_config_files(path);
            if discovered.is_empty() {
                eprintln!("[DEBUG] No config files discovered for: {}", path.display());
            } else {
                eprintln!("[DEBUG] Discovered config files for {}:", path.display());
                for f in &discovered {
                    eprintln!("[DEBUG]   - {}", f.display());
                }
            }
        }
        Config::from_discovered_files(path)
    } else {
        // No path provided, use current directory for discovery
        Config::from_discovered_files(&std::env::current_dir().unwrap_or_default())
    };

    // Override with CLI arguments
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if let Some(spacing) = args.spacing {
        config.spacing = spacing;
    }
    if let Some(width) = args.width {
        config.width = width;
    }

    // Print final config in debug mode
    if args.debug {
        eprintln!("[DEBUG] Configuration:");
        eprintln!("[DEBUG]   indent: {}", config.indent);
        eprintln!("[DEBUG]   spacing: {}", config.spacing);
        eprintln!("[DEBUG]   width: {}", config.width);
    }

    // Validate configuration
    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    // Compile exclude patterns
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let custom_extensions = &args.substitution_extensions;

    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            if args.recursive {
                // Recursive directory traversal
                // Note: WalkDir detects symlink loops when follow_links(true) and
                // returns errors for them. We skip errors via filter_map(ok).
                // max_depth prevents runaway traversal in pathological directory structures.
                for entry in WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(256)
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                {
                    let path = entry.path();
                    if path.is_file()
                        && is_substitution_file(path, custom_extensions)
                        && !is_excluded(path, &exclude_patterns)
                    {
                        files.push(path.to_path_buf());
                    }
                }
            } else {
                // Non-recursive: only direct children
                if let Ok(entries) = std::fs::read_dir(input) {
                    for entry in entries.filter_map(std::result::Result::ok) {
                        let path = entry.path();
                        if path.is_file()
                            && is_substitution_file(&path, custom_extensions)
                            && !is_excluded(&path, &exclude_patterns)
                        {
                            files.push(path);
                        }
                    }
                }
            }
        }
    }

    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        // Match against full path
        if pattern.matches(&path_str) {
            return true;
        }

        // Match against file name only
        if let Some(file_name) = path.file_name() {
            if pattern.matches(&file_name.to_string_lossy()) {
                return true;
            }
        }

        // Match against each path component (for directory patterns)
        for component in path.components() {
            if let std::path::Component::Normal(c) = component {
                if pattern.matches(&c.to_string_lossy()) {
                    return true;
                }
            }
        }
    }

    false
}

/// Check if a file has a substitution extension
/// Checks against both default extensions and any custom extensions provided
fn is_substitution_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            // Check default extensions
            if SUBSTITUTION_EXTENSIONS.contains(&ext) {
                return true;
            }
            // Check custom extensions (with or without leading dot)
            for custom in custom_extensions {
                let custom_ext = custom.strip_prefix('.').unwrap_or(custom);
                if ext == custom_ext {
                    return true;
                }
            }
            false
        })
}

/// Process files sequentially (for stdout output)
///
/// Returns the number of files that failed.
fn process_files_sequential(
    files: &[PathBuf],
    base_config: Option<&Config>,
    args: &CliArgs,
) -> usize {
    let mut errors = 0;
    for path in files {
        // Use base config if provided, otherwise discover per-file config
        let file_result = if let Some(config) = base_config {
            process_single_file(path, config, args)
        } else {
            match build_config(args, Some(path)) {
                Ok(config) => process_single_file(path, &config, args),
                Err(e) => Err(e),
            }
        };

        if let Err(e) = file_result {
            errors += 1;
            eprintln!("Error formatting {}: {}", path.display(), e);
        }
    }
    errors
}

/// Process files in parallel using Rayon
///
/// Returns the number of files that failed.
fn process_files_parallel(files: &[PathBuf], base_config: Option<&Config>, args: &CliArgs) -> usize {
    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        // Use base config if provided, otherwise discover per-file config
        let file_result = if let Some(config) = base_config {
            process_single_file(path, config, args)
        } else {
            match build_config(args, Some(path)) {
                Ok(config) => process_single_file(path, &config, args),
                Err(e) => Err(e),
            }
        };

        match file_result {
            Ok(()) => {
                success_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error_count.fetch_add(1, Ordering::Relaxed);
                eprintln!("Error formatting {}: {}", path.display(), e);
            }
        }
    });

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    if !args.silent {
        if errors == 0 {
            eprintln!("Formatted {success} files successfully.");
        } else {
            eprintln!("Formatted {success} files, {errors} errors.");
        }
    }

    errors
}

/// Apply directive overrides from file contents to a configuration
fn apply_directive_overrides(config: &mut Config, contents: &[u8], debug: bool, source_name: &str) {
    let cursor = Cursor::new(contents);
    if let Some(overrides) = find_directive(&mut BufReader::new(cursor)) {
        if debug {
            eprintln!("[DEBUG] Found file directive in {source_name}");
        }
        if let Some(indent) = overrides.indent {
            if debug {
                eprintln!("[DEBUG]   Directive override: indent = {indent}");
            }
            config.indent = indent;
        }
        if let Some(spacing) = overrides.spacing {
            if debug {
                eprintln!("[DEBUG]   Directive override: spacing = {spacing}");
            }
            config.spacing = spacing;
        }
        if let Some(width) = overrides.width {
            if debug {
                eprintln!("[DEBUG]   Directive override: width = {width}");
            }
            config.width = width;
        }
    }
}

/// Process a single file
fn process_single_file(path: &PathBuf, config: &Config, args: &CliArgs) -> Result<()> {
    // Check file size BEFORE reading to prevent memory exhaustion
    let metadata = std::fs::metadata(path)?;
    let file_size = metadata.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !args.silent {
            let size_mb = file_size / (1024 * 1024);
            let limit_mb = DEFAULT_MAX_FILE_SIZE / (1024 * 1024);
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                size_mb,
                limit_mb
            );
        }
        return Ok(());
    }

    // Read input file into memory
    let mut file_contents = Vec::new();
    File::open(path)?.read_to_end(&mut file_contents)?;

    if !args.silent && !args.stdout {
        eprintln!("Formatting: {}", path.display());
    }

    // Make a per-file copy of config that can be overridden by directives
    let mut file_config = config.clone();
    apply_directive_overrides(
        &mut file_config,
        &file_contents,
        args.debug,
        path.to_str().unwrap_or("unknown"),
    );
    if let Some(error) = file_config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    // Format the file; nothing is written until parsing succeeds
    let mut sink = make_sink(args);
    let reader = BufReader::new(Cursor::new(&file_contents));
    let mut output = Vec::new();
    format_file(
        reader,
        &mut output,
        &file_config,
        path.to_str().unwrap_or("unknown"),
        sink.as_mut(),
    )?;

    // Output results
    if args.stdout {
        io::stdout().write_all(&output)?;
    } else {
        if !args.no_backup {
            write_backup(path)?;
        }
        // Rewrite in place so attributes, the inode, and hard links survive
        std::fs::write(path, &output)?;
    }

    Ok(())
}

/// Process input from stdin, output to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<()> {
    // Read all input from stdin
    let mut stdin_contents = Vec::new();
    io::stdin().read_to_end(&mut stdin_contents)?;

    // Check size after reading to prevent processing extremely large input
    #[allow(clippy::cast_possible_truncation)]
    let stdin_size = stdin_contents.len() as u64;
    if stdin_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            stdin_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    // Make a copy of config that can be overridden by directives
    let mut file_config = config.clone();
    apply_directive_overrides(&mut file_config, &stdin_contents, args.debug, "<stdin>");
    if let Some(error) = file_config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    // Format the input
    let mut sink = make_sink(args);
    let reader = BufReader::new(Cursor::new(&stdin_contents));
    let mut output = Vec::new();
    format_file(reader, &mut output, &file_config, "<stdin>", sink.as_mut())?;

    // Always output to stdout when reading from stdin
    io::stdout().write_all(&output)?;

    Ok(())
}

/// Pick the diagnostic sink implied by the CLI flags
fn make_sink(args: &CliArgs) -> Box<dyn DiagnosticSink> {
    if args.silent {
        Box::new(SilentSink)
    } else {
        Box::new(StderrSink::new(args.debug))
    }
}

fn print_usage() {
    println!(
        "subtidy v{} - EPICS substitution file formatter",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Performs layout formatting on one or more EPICS substitution files,");
    println!("aligning the pattern columns across each file block.");
    println!();
    println!("Usage:");
    println!("  subtidy [OPTIONS] <FILE>...");
    println!("  subtidy [OPTIONS] -r <DIRECTORY>");
    println!("  subtidy [OPTIONS] -                      # Read from stdin");
    println!("  cat ioc.substitutions | subtidy          # Pipe input");
    println!();
    println!("Examples:");
    println!("  subtidy ioc.substitutions                # Format single file in-place");
    println!("  subtidy *.substitutions                  # Format multiple files");
    println!("  subtidy -r db/                           # Recursively format directory");
    println!("  subtidy --stdout ioc.substitutions       # Output to stdout");
    println!("  subtidy -i 2 -s 1 ioc.substitutions      # 2-space indent, 1 space after commas");
    println!();
    println!("Options:");
    println!("  -i, --indent <NUM>      Spaces before pattern rows, 1 to 8 [default: 4]");
    println!("  -s, --spacing <NUM>     Spaces after a comma, 1 to 8 [default: 2]");
    println!("  -w, --width <NUM>       Soft maximum line length, 60 to 800 [default: 120]");
    println!("  -r, --recursive         Process directories recursively");
    println!("  -e, --exclude <PATTERN> Exclude files/dirs matching pattern (repeatable)");
    println!("  -x, --extension <EXT>   Additional substitution extension (repeatable)");
    println!("  -n, --no-backup         Don't write numbered backups");
    println!("  -j, --jobs <NUM>        Parallel jobs (0=auto, 1=sequential)");
    println!("  --stdout                Output to stdout instead of in-place");
    println!("  -c, --config <FILE>     Config file path (overrides auto-discovery)");
    println!("  -D, --debug             Enable debug output");
    println!("  -S, --silent            Silent mode");
    println!("  -h, --help              Print help");
    println!();
    println!("Before in-place formatting, the previous content is kept as <file>.~");
    println!("with older backups rotated through <file>.1~ to <file>.4~.");
    println!();
    println!("Supported extensions: .substitutions, .subs");
    println!();
    println!("Config file auto-discovery:");
    println!("  Searches for subtidy.toml in parent directories");
    println!("  starting from the file being formatted up to the root directory.");
    println!("  Also checks subtidy.toml in the home directory.");
    println!("  More specific configs (closer to file) override less specific ones.");
}
