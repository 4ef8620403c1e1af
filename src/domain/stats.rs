//! Statistics Helpers
//!
//! Pure numeric routines backing the quality metrics:
//! - Welch two-sample t-test (two-sided)
//! - Benjamini-Hochberg FDR adjustment
//! - Student t tail probability via the regularised incomplete beta function
//!
//! 无外部依赖，可独立测试

use serde::{Deserialize, Serialize};

const BETA_CF_MAX_ITER: usize = 300;
const BETA_CF_EPS: f64 = 3.0e-16;
const BETA_CF_FPMIN: f64 = 1.0e-300;

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n-1 denominator), NaN below two observations
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    ss / (values.len() - 1) as f64
}

/// t 检验结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Welch's unequal-variance t-test, statistic sign follows `mean(a) - mean(b)`
pub fn welch_t_test(a: &[f64], b: &[f64]) -> TTestResult {
    let (na, nb) = (a.len(), b.len());
    if na < 2 || nb < 2 {
        return TTestResult {
            statistic: f64::NAN,
            df: f64::NAN,
            p_value: 1.0,
        };
    }

    let diff = mean(a) - mean(b);
    let va = sample_variance(a) / na as f64;
    let vb = sample_variance(b) / nb as f64;
    let se2 = va + vb;

    // 两组方差均为零
    if se2 == 0.0 {
        let df = (na + nb - 2) as f64;
        return if diff == 0.0 {
            TTestResult { statistic: 0.0, df, p_value: 1.0 }
        } else {
            TTestResult {
                statistic: diff.signum() * f64::INFINITY,
                df,
                p_value: 0.0,
            }
        };
    }

    let statistic = diff / se2.sqrt();
    let df = se2 * se2 / (va * va / (na - 1) as f64 + vb * vb / (nb - 1) as f64);
    TTestResult {
        statistic,
        df,
        p_value: student_t_two_sided(statistic, df),
    }
}

/// Two-sided tail probability `P(|T| >= |t|)` for Student's t with `df` degrees of freedom
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Benjamini-Hochberg adjusted p-values, returned in input order
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| p_values[i].total_cmp(&p_values[j]));

    let mut adjusted = vec![1.0; m];
    let mut running_min = 1.0_f64;
    // 从最大的 p 值向下累积最小值，保证单调
    for (rank, &idx) in order.iter().enumerate().rev() {
        let p = p_values[idx];
        let candidate = if p.is_nan() { 1.0 } else { p * m as f64 / (rank + 1) as f64 };
        running_min = running_min.min(candidate);
        // p*m/m 可能因舍入略小于 p
        adjusted[idx] = running_min.min(1.0).max(p);
    }
    adjusted
}

/// 描述性统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Describe {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Describe {
        mean: mean(values),
        std_dev: sample_variance(values).sqrt(),
        min: if values.is_empty() { f64::NAN } else { min },
        max: if values.is_empty() { f64::NAN } else { max },
    }
}

/// ln Γ(x) for x > 0 (Lanczos approximation)
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// I_x(a, b)
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

// Lentz 连分式求值
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let guard = |v: f64| if v.abs() < BETA_CF_FPMIN { BETA_CF_FPMIN } else { v };

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=BETA_CF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < BETA_CF_EPS {
            break;
        }
    }
    h
}
