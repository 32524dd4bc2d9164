/// A named request fixture measured by the benchmarks.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, file: TestFile) -> Self {
        Self { name, file }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }
}

/// Raw bytes of a request head, as a client would send them.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// Header fields of the request head, in the order they appear.
    pub fn headers(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.content
            .lines()
            .skip(1)
            .map_while(|line| line.trim_end().split_once(':'))
            .map(|(name, value)| (name.trim(), value.trim()))
    }
}
