use std::path::PathBuf;
use std::time::{Duration, Instant};

use argh::FromArgs;

use wrapconv_imgproc::filter::{convolve, FilterError};
use wrapconv_imgproc::parallel::ExecutionStrategy;
use wrapconv_io::{functional as F, kernel::read_kernel_txt, png::write_image_png_rgba8, IoError};

#[derive(FromArgs, Debug)]
/// Apply a 2D convolution kernel with wrap-around borders to an image
pub struct Args {
    /// path to the input image
    #[argh(positional)]
    pub image_path: PathBuf,

    /// path to the kernel text file: `width height` followed by the weights
    #[argh(positional)]
    pub filter_path: PathBuf,

    /// path of the output png image
    #[argh(positional)]
    pub output_path: PathBuf,

    /// number of row chunks (defaults to the available parallelism)
    #[argh(option, short = 'j')]
    pub workers: Option<usize>,

    /// run on the current thread only
    #[argh(switch)]
    pub serial: bool,

    /// print debug information
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// The execution strategy selected by the flags.
    pub fn strategy(&self) -> ExecutionStrategy {
        match (self.serial, self.workers) {
            (true, _) => ExecutionStrategy::Serial,
            (false, Some(n)) => ExecutionStrategy::Workers(n),
            (false, None) => ExecutionStrategy::Auto,
        }
    }
}

/// Errors reported by the command line driver.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The kernel file could not be loaded.
    #[error("Could not load the filter: {0}")]
    LoadFilter(#[source] IoError),

    /// The input image could not be loaded.
    #[error("Could not load the image: {0}")]
    LoadImage(#[source] IoError),

    /// The convolution could not run.
    #[error("Could not apply the filter: {0}")]
    Convolve(#[from] FilterError),

    /// The output image could not be saved.
    #[error("Could not save the image: {0}")]
    SaveImage(#[source] IoError),
}

/// Load the kernel and the image, convolve, and save the result.
///
/// # Returns
///
/// The wall-clock time spent in the convolution alone.
pub fn run(args: &Args) -> Result<Duration, AppError> {
    log::info!("Image:  {}", args.image_path.display());
    log::info!("Filter: {}", args.filter_path.display());

    let kernel = read_kernel_txt(&args.filter_path).map_err(AppError::LoadFilter)?;
    log::debug!("{}x{} kernel:\n{kernel}", kernel.width(), kernel.height());

    let image = F::read_image_rgba8(&args.image_path).map_err(AppError::LoadImage)?;
    log::debug!("loaded image of {}", image.size());

    let start = Instant::now();
    let output = convolve(&image, &kernel, args.strategy())?;
    let elapsed = start.elapsed();

    write_image_png_rgba8(&args.output_path, &output).map_err(AppError::SaveImage)?;

    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrapconv_image::Rgba8Image;
    use wrapconv_io::png::read_image_png_rgba8;

    fn args(dir: &std::path::Path) -> Args {
        Args {
            image_path: dir.join("in.png"),
            filter_path: dir.join("filter.txt"),
            output_path: dir.join("out.png"),
            workers: Some(2),
            serial: false,
            verbose: false,
        }
    }

    #[test]
    fn run_blur() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let args = args(tmp_dir.path());

        let image = Rgba8Image::new([2, 2].into(), [100, 100, 100, 255].repeat(4))?;
        write_image_png_rgba8(&args.image_path, &image)?;
        std::fs::write(
            &args.filter_path,
            "3 3\n0.1111111111111111 0.1111111111111111 0.1111111111111111\n\
             0.1111111111111111 0.1111111111111111 0.1111111111111111\n\
             0.1111111111111111 0.1111111111111111 0.1111111111111111\n",
        )?;

        run(&args)?;

        let output = read_image_png_rgba8(&args.output_path)?;
        assert_eq!(output.size(), image.size());
        assert!(output
            .as_slice()
            .chunks_exact(4)
            .all(|px| px[3] == 255 && px[0] >= 99));
        Ok(())
    }

    #[test]
    fn run_missing_filter_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let args = args(tmp_dir.path());

        let image = Rgba8Image::new([1, 1].into(), vec![1, 2, 3, 4])?;
        write_image_png_rgba8(&args.image_path, &image)?;

        let res = run(&args);
        assert!(matches!(res, Err(AppError::LoadFilter(_))));
        assert!(!args.output_path.exists());
        Ok(())
    }

    #[test]
    fn run_bad_image() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let args = args(tmp_dir.path());

        std::fs::write(&args.image_path, b"not an image")?;
        std::fs::write(&args.filter_path, "1 1 1.0")?;

        let res = run(&args);
        assert!(matches!(res, Err(AppError::LoadImage(_))));
        assert!(!args.output_path.exists());
        Ok(())
    }

    #[test]
    fn strategy_from_flags() {
        let mut args = args(std::path::Path::new("."));
        assert_eq!(args.strategy(), ExecutionStrategy::Workers(2));
        args.serial = true;
        assert_eq!(args.strategy(), ExecutionStrategy::Serial);
        args.serial = false;
        args.workers = None;
        assert_eq!(args.strategy(), ExecutionStrategy::Auto);
    }

    #[test]
    fn parse_positionals() {
        let args = Args::from_args(&["wrapconv"], &["a.png", "f.txt", "b.png", "-j", "3"])
            .map_err(|e| e.output);
        assert!(matches!(args, Ok(Args { workers: Some(3), .. })));

        let missing = Args::from_args(&["wrapconv"], &["a.png", "f.txt"]);
        assert!(missing.is_err());
    }
}
