/// Which series to process when a directory holds more than one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SeriesSelection {
    /// The first series by Series Instance UID; extra series are logged.
    #[default]
    First,
    /// Exactly one series must be present.
    Single,
    /// The series with this Series Instance UID.
    Uid(String),
}

/// How the ordering tag value is turned into a number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyParsing {
    /// Use the longest numeric prefix of the value, ignoring trailing text.
    #[default]
    Permissive,
    /// The whole value (minus padding) must be a number.
    Strict,
}

/// How slices are decoded before the sort barrier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    /// Decode and extract keys on the rayon thread pool.
    Parallel,
}
