//! Special functions needed by the Green kernels: modified Bessel
//! functions of the second kind, the exponential integral and the
//! Bessel-integral function of order zero.
//!
//! Polynomial approximations follow Abramowitz & Stegun §9.8 and §5.1;
//! absolute accuracy is better than 1e-7 over the arguments the kernels
//! produce, which is far below the quadrature error of the solver itself.

pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75) * (x / 3.75);
        1.0 + y
            * (3.5156229
                + y * (3.0899424
                    + y * (1.2067492 + y * (0.2659732 + y * (0.360768e-1 + y * 0.45813e-2)))))
    } else {
        let y = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + y * (0.1328592e-1
                    + y * (0.225319e-2
                        + y * (-0.157565e-2
                            + y * (0.916281e-2
                                + y * (-0.2057706e-1
                                    + y * (0.2635537e-1
                                        + y * (-0.1647633e-1 + y * 0.392377e-2))))))))
    }
}

fn bessel_i1(x: f64) -> f64 {
    let ax = x.abs();
    let ans = if ax < 3.75 {
        let y = (x / 3.75) * (x / 3.75);
        ax * (0.5
            + y * (0.87890594
                + y * (0.51498869
                    + y * (0.15084934 + y * (0.2658733e-1 + y * (0.301532e-2 + y * 0.32411e-3))))))
    } else {
        let y = 3.75 / ax;
        let a = 0.2282967e-1 + y * (-0.2895312e-1 + y * (0.1787654e-1 - y * 0.420059e-2));
        let b = 0.39894228 + y * (-0.3988024e-1 + y * (-0.362018e-2 + y * (0.163801e-2 + y * (-0.1031555e-1 + y * a))));
        (ax.exp() / ax.sqrt()) * b
    };
    if x < 0.0 {
        -ans
    } else {
        ans
    }
}

/// Modified Bessel function of the second kind, order zero.
pub fn bessel_k0(x: f64) -> f64 {
    debug_assert!(x > 0.0);
    if x <= 2.0 {
        let y = x * x / 4.0;
        -(x / 2.0).ln() * bessel_i0(x) - EULER_GAMMA
            + y * (0.42278420
                + y * (0.23069756
                    + y * (0.3488590e-1 + y * (0.262698e-2 + y * (0.10750e-3 + y * 0.74e-5)))))
    } else {
        let y = 2.0 / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (-0.7832358e-1
                    + y * (0.2189568e-1
                        + y * (-0.1062446e-1
                            + y * (0.587872e-2 + y * (-0.251540e-2 + y * 0.53208e-3))))))
    }
}

/// Modified Bessel function of the second kind, order one.
pub fn bessel_k1(x: f64) -> f64 {
    debug_assert!(x > 0.0);
    if x <= 2.0 {
        let y = x * x / 4.0;
        (x / 2.0).ln() * bessel_i1(x)
            + (1.0 / x)
                * (1.0
                    + y * (0.15443144
                        + y * (-0.67278579
                            + y * (-0.18156897
                                + y * (-0.1919402e-1 + y * (-0.110404e-2 - y * 0.4686e-4))))))
    } else {
        let y = 2.0 / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (0.23498619
                    + y * (-0.3655620e-1
                        + y * (0.1504268e-1
                            + y * (-0.780353e-2 + y * (0.325614e-2 - y * 0.68245e-3))))))
    }
}

/// Exponential integral `E1(x) = ∫_x^∞ e^(-t)/t dt` for `x > 0`.
///
/// Power series below 1, Lentz continued fraction above.
pub fn expint_e1(x: f64) -> f64 {
    debug_assert!(x > 0.0);
    if x < 1.0 {
        let mut sum = 0.0;
        let mut term = 1.0;
        for n in 1..=40 {
            term *= -x / n as f64;
            sum -= term / n as f64;
            if term.abs() < 1e-17 {
                break;
            }
        }
        sum - EULER_GAMMA - x.ln()
    } else {
        let mut b = x + 1.0;
        let mut c = 1e308;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=100 {
            let a = -(i as f64) * (i as f64);
            b += 2.0;
            d = 1.0 / (a * d + b);
            c = b + a / c;
            let del = c * d;
            h *= del;
            if (del - 1.0).abs() < 1e-15 {
                break;
            }
        }
        h * (-x).exp()
    }
}

const JI0_TERMS: usize = 50;

/// `∫_0^x (1 - J0(u))/u du`, the integral term of the Bessel-integral
/// function. Truncated power series, valid for `0 <= x <= ~30`.
fn ji0c(x: f64) -> f64 {
    let q = 0.25 * x * x;
    let mut val = 0.0;
    let mut fact = 1.0; // n!
    let mut pow = 1.0; // (-q)^n
    for n in 1..=JI0_TERMS {
        fact *= n as f64;
        pow *= -q;
        val -= 0.5 * pow / (fact * fact * n as f64);
    }
    val
}

/// Bessel-integral function of order zero,
/// `Ji0(x) = γ + ln(x/2) - ∫_0^x (1 - J0(u))/u du` (Humbert 1929, eq. 3).
pub fn ji0(x: f64) -> f64 {
    -ji0c(x) + (x / 2.0).ln() + EULER_GAMMA
}
