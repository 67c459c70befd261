use rand::{rngs::StdRng, Rng, SeedableRng};

use wrapconv_image::{ImageSize, Rgba8Image};
use wrapconv_imgproc::filter::{convolve, FilterError, Kernel2d};
use wrapconv_imgproc::parallel::ExecutionStrategy;

fn random_image(rng: &mut StdRng, size: ImageSize) -> Rgba8Image {
    let mut data = vec![0u8; size.width * size.height * 4];
    rng.fill(data.as_mut_slice());
    Rgba8Image::new(size, data).unwrap()
}

fn random_kernel(rng: &mut StdRng, width: usize, height: usize) -> Kernel2d {
    let data = (0..width * height)
        .map(|_| rng.random_range(-0.5..1.0))
        .collect();
    Kernel2d::new(width, height, data).unwrap()
}

// straightforward per-pixel evaluation with signed coordinates
fn reference(src: &Rgba8Image, kernel: &Kernel2d) -> Rgba8Image {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let (kw, kh) = (kernel.width() as i64, kernel.height() as i64);
    let mut dst = Rgba8Image::from_size_val(src.size(), 0).unwrap();

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f64; 3];
            for fy in 0..kh {
                for fx in 0..kw {
                    let sx = (x - kw / 2 + fx).rem_euclid(w) as usize;
                    let sy = (y - kh / 2 + fy).rem_euclid(h) as usize;
                    let px = src.get_pixel(sx, sy).unwrap();
                    let weight = kernel.get(fx as usize, fy as usize).unwrap();
                    for c in 0..3 {
                        acc[c] += px[c] as f64 * weight;
                    }
                }
            }
            let alpha = src.get_pixel(x as usize, y as usize).unwrap()[3];
            let clamp = |v: f64| (v as i64).clamp(0, 255) as u8;
            dst.set_pixel(
                x as usize,
                y as usize,
                [clamp(acc[0]), clamp(acc[1]), clamp(acc[2]), alpha],
            )
            .unwrap();
        }
    }

    dst
}

#[test]
fn test_matches_reference() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(7);

    for (size, (kw, kh)) in [
        ([17, 13], (3, 3)),
        ([8, 5], (4, 2)),
        ([3, 2], (7, 9)),
        ([1, 9], (5, 1)),
        ([11, 1], (1, 6)),
    ] {
        let src = random_image(&mut rng, size.into());
        let kernel = random_kernel(&mut rng, kw, kh);
        let expected = reference(&src, &kernel);

        let dst = convolve(&src, &kernel, ExecutionStrategy::Workers(3))?;
        assert_eq!(dst, expected, "mismatch for {size:?} with {kw}x{kh} kernel");
    }

    Ok(())
}

#[test]
fn test_deterministic_across_workers() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(42);
    let src = random_image(&mut rng, [23, 19].into());
    let kernel = random_kernel(&mut rng, 5, 3);

    let expected = convolve(&src, &kernel, ExecutionStrategy::Serial)?;
    let height = src.height();

    for strategy in [
        ExecutionStrategy::Workers(1),
        ExecutionStrategy::Workers(2),
        ExecutionStrategy::Workers(4),
        ExecutionStrategy::Workers(height),
        ExecutionStrategy::Workers(height + 10),
        ExecutionStrategy::Fixed(3),
        ExecutionStrategy::Auto,
    ] {
        let dst = convolve(&src, &kernel, strategy)?;
        assert_eq!(dst, expected, "result differs with {strategy:?}");
    }

    Ok(())
}

#[test]
fn test_preserves_size_and_alpha() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(3);
    let src = random_image(&mut rng, [31, 7].into());
    let kernel = random_kernel(&mut rng, 3, 3);

    let dst = convolve(&src, &kernel, ExecutionStrategy::Auto)?;
    assert_eq!(dst.size(), src.size());

    let alpha_in = src.as_slice().chunks_exact(4).map(|px| px[3]);
    let alpha_out = dst.as_slice().chunks_exact(4).map(|px| px[3]);
    assert!(alpha_in.eq(alpha_out));

    Ok(())
}

#[test]
fn test_identity_reproduces_input() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(11);
    let src = random_image(&mut rng, [12, 10].into());

    let dst = convolve(&src, &Kernel2d::identity(), ExecutionStrategy::Workers(3))?;
    assert_eq!(dst, src);

    Ok(())
}

#[test]
fn test_nested_in_single_thread_pool() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(5);
    let src = random_image(&mut rng, [9, 8].into());
    let kernel = random_kernel(&mut rng, 3, 3);

    let expected = convolve(&src, &kernel, ExecutionStrategy::Serial)?;

    // the only pool thread runs the last chunk itself and then the spawned one
    let dst = ExecutionStrategy::Fixed(1).install(|| {
        assert_eq!(rayon::current_num_threads(), 1);
        convolve(&src, &kernel, ExecutionStrategy::Workers(2))
    })??;
    assert_eq!(dst, expected);

    Ok(())
}
