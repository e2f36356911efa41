/// One `param=value` sample of a cgroup, as it appeared in a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub cgroup: String,
    pub param: String,
    pub value: String,
}

/// All samples carried by a single log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: String,
    pub entries: Vec<Entry>,
}
