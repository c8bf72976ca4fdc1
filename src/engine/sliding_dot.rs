use realfft::RealFftPlanner;

/// Problem size (n * m) above which the FFT seed path beats the direct loop.
const FFT_THRESHOLD: usize = 256 * 1024;

/// Dot product of the window `window` against every length-`m` window of
/// `series`: element `j` is `dot(window, series[j..j+m])`.
///
/// This seeds each diagonal of a join; subsequent values along a diagonal are
/// advanced in O(1) by the drivers via the QT recurrence. Dispatches to an
/// FFT-based O(n log n) path for large inputs and a direct O(n*m) loop below
/// the threshold; both produce identical results up to floating-point
/// tolerance.
pub fn sliding_dot_product(window: &[f64], series: &[f64]) -> Vec<f64> {
    let m = window.len();
    let n = series.len();
    debug_assert!(n >= m && m > 0);
    if n * m > FFT_THRESHOLD {
        sliding_dot_product_fft(window, series)
    } else {
        sliding_dot_product_direct(window, series)
    }
}

/// Direct O(n*m) sliding dot product.
pub fn sliding_dot_product_direct(window: &[f64], series: &[f64]) -> Vec<f64> {
    let m = window.len();
    let n_subs = series.len() - m + 1;
    let mut out = Vec::with_capacity(n_subs);
    for j in 0..n_subs {
        let dot = window
            .iter()
            .zip(&series[j..j + m])
            .map(|(a, b)| a * b)
            .sum();
        out.push(dot);
    }
    out
}

/// FFT-based O(n log n) sliding dot product.
///
/// Convolves the reversed window with the series via real-to-complex FFT and
/// reads the dot products out of the valid region of the linear convolution.
pub fn sliding_dot_product_fft(window: &[f64], series: &[f64]) -> Vec<f64> {
    let m = window.len();
    let n = series.len();
    let n_subs = n - m + 1;
    let fft_len = (n + m - 1).next_power_of_two();

    let mut planner = RealFftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    // Reversed window, zero-padded.
    let mut w_buf = vec![0.0; fft_len];
    for (dst, &src) in w_buf[..m].iter_mut().zip(window.iter().rev()) {
        *dst = src;
    }
    let mut s_buf = vec![0.0; fft_len];
    s_buf[..n].copy_from_slice(series);

    let mut w_spec = forward.make_output_vec();
    let mut s_spec = forward.make_output_vec();
    // Buffer lengths match the plan by construction.
    forward.process(&mut w_buf, &mut w_spec).unwrap();
    forward.process(&mut s_buf, &mut s_spec).unwrap();

    for (w, s) in w_spec.iter_mut().zip(s_spec.iter()) {
        *w *= s;
    }

    let mut conv = vec![0.0; fft_len];
    inverse.process(&mut w_spec, &mut conv).unwrap();

    // The inverse transform is unnormalized; dot products sit at lags
    // m-1 .. m-1+n_subs of the convolution.
    let scale = 1.0 / fft_len as f64;
    conv[m - 1..m - 1 + n_subs].iter().map(|&x| x * scale).collect()
}
