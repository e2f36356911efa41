use clap::ValueEnum;

/// Display unit for memory values.
///
/// Decimal and binary prefixes are deliberately treated alike: all of them
/// scale by powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Unit {
    #[default]
    #[value(name = "B")]
    B,
    #[value(name = "kB")]
    KB,
    #[value(name = "kiB")]
    KiB,
    #[value(name = "MB")]
    MB,
    #[value(name = "MiB")]
    MiB,
    #[value(name = "GB")]
    GB,
    #[value(name = "GiB")]
    GiB,
}

impl Unit {
    pub fn divisor(self) -> u64 {
        match self {
            Unit::B => 1,
            Unit::KB | Unit::KiB => 1024,
            Unit::MB | Unit::MiB => 1024 * 1024,
            Unit::GB | Unit::GiB => 1024 * 1024 * 1024,
        }
    }
}
