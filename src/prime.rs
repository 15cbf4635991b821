//! Prime helpers used to size hash table bucket arrays.

/// Returns true if `n` is prime.
pub fn is_prime(n: usize) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Returns the smallest prime strictly greater than `n`.
pub fn next_prime(n: usize) -> usize {
    if n <= 1 {
        return 2;
    }
    let mut candidate = n + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}
