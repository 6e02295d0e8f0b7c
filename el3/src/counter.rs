//! Consistent reads of a 64-bit counter exposed as two 32-bit halves.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    Low,
    High,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Unstable { retries: usize },
}

/// Reads high, low, high and retries until the two high reads agree, so the
/// low half always belongs to the same epoch as the high half it is paired
/// with. Gives up after `retries` extra attempts.
pub fn read_consistent<F>(mut read: F, retries: usize) -> Result<u64, Error>
where
    F: FnMut(Half) -> u32,
{
    let mut high = read(Half::High);
    let mut low = read(Half::Low);
    let mut high_again = read(Half::High);

    let mut attempts = 0;
    while high != high_again {
        if attempts == retries {
            return Err(Error::Unstable { retries });
        }
        attempts += 1;
        high = high_again;
        low = read(Half::Low);
        high_again = read(Half::High);
    }

    Ok(((high as u64) << 32) | low as u64)
}
