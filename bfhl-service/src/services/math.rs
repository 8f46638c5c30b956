//! Pure numeric routines behind the `fibonacci`, `prime`, `hcf` and `lcm` keys.

use service_core::error::AppError;

pub const MAX_FIBONACCI_TERMS: i64 = 1000;
pub const MAX_PRIME_INPUTS: usize = 2000;
pub const MAX_HCF_INPUTS: usize = 2000;
pub const MAX_LCM_INPUTS: usize = 1000;
pub const MAX_LCM_MAGNITUDE: u64 = 100_000;

/// First `n` Fibonacci numbers starting at `0, 1`.
///
/// Terms are 32-bit two's-complement: past the 47th term they wrap, which is
/// what existing clients of this endpoint have always observed.
pub fn fibonacci(n: i64) -> Result<Vec<i32>, AppError> {
    if !(0..=MAX_FIBONACCI_TERMS).contains(&n) {
        return Err(AppError::bad_request(
            "fibonacci must be between 0 and 1000.",
        ));
    }

    let n = n as usize;
    let mut seq: Vec<i32> = Vec::with_capacity(n);
    if n >= 1 {
        seq.push(0);
    }
    if n >= 2 {
        seq.push(1);
    }
    while seq.len() < n {
        let next = seq[seq.len() - 1].wrapping_add(seq[seq.len() - 2]);
        seq.push(next);
    }
    Ok(seq)
}

/// The prime members of `values`, in their original order.
pub fn primes(values: &[i64]) -> Result<Vec<i64>, AppError> {
    check_len(values, "prime", MAX_PRIME_INPUTS)?;
    Ok(values.iter().copied().filter(|&n| is_prime(n)).collect())
}

pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 || n == 3 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Greatest common divisor of the absolute values of `values`.
pub fn hcf(values: &[i64]) -> Result<u64, AppError> {
    check_len(values, "hcf", MAX_HCF_INPUTS)?;
    Ok(values
        .iter()
        .fold(0, |acc, &x| gcd(acc, x.unsigned_abs())))
}

/// Least common multiple of `values`; zero if any input is zero.
pub fn lcm(values: &[i64]) -> Result<u64, AppError> {
    check_len(values, "lcm", MAX_LCM_INPUTS)?;
    if values.iter().any(|x| x.unsigned_abs() > MAX_LCM_MAGNITUDE) {
        return Err(AppError::bad_request(
            "lcm values too large (abs must be <= 100000).",
        ));
    }

    values.iter().try_fold(1u64, |acc, &x| {
        lcm2(acc, x.unsigned_abs())
            .ok_or_else(|| AppError::bad_request("lcm result too large (exceeds 64-bit range)."))
    })
}

fn check_len(values: &[i64], name: &str, max: usize) -> Result<(), AppError> {
    if values.is_empty() {
        return Err(AppError::bad_request(format!(
            "{} must be a non-empty integer array.",
            name
        )));
    }
    if values.len() > max {
        return Err(AppError::bad_request(format!(
            "{} array too large (max {}).",
            name, max
        )));
    }
    Ok(())
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// `None` on overflow.
fn lcm2(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}
