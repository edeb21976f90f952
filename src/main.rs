use anyhow::Result;
use clap::Parser;
use console::style;

use png_converter::cli::Args;
use png_converter::image_processing::{codec, convert_to_png, policy, process_directory};
use png_converter::reporter::Reporter;
use png_converter::utils::{resolve_target, Target};

fn main() -> Result<()> {
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    let mut reporter = Reporter::new(args.json_progress, args.verbose, args.report);

    // Fatal errors exit with status 1 before any file is touched
    codec::check_capabilities()?;
    let target = resolve_target(&args.path)?;

    match target {
        Target::File(path) => {
            if !args.json_progress {
                println!("{}", style("Converting single file...").bold());
            }
            let options = args.conversion_options(true);
            let output = args
                .keep_originals
                .then(|| policy::kept_original_output_path(&path));

            reporter.file_started(&path);
            let report = convert_to_png(&path, output.as_deref(), &options);
            reporter.file_finished(&report);
            reporter.print_table();
        }
        Target::Directory(root) => {
            if args.keep_originals {
                reporter.warning(
                    "--keep-originals flag is not supported for directory processing. \
                     Original files will be replaced with PNG versions.",
                );
            }
            let options = args.conversion_options(false);
            reporter.verbose(&format!(
                "Recursive: {}, preserve transparency: {}",
                args.recursive(),
                options.preserve_transparency
            ));

            reporter.start_walk(&root);
            let (summary, elapsed) =
                process_directory(&root, args.recursive(), &options, |event| {
                    reporter.on_event(event)
                });
            reporter.summary(&summary, elapsed);
        }
    }

    Ok(())
}
