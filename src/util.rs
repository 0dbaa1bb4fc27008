pub(crate) mod text;
pub(crate) mod uri;

pub(crate) trait StrExt {
    fn ends_with_ignore_case(&self, end: &str) -> bool;

    fn starts_with_ignore_case(&self, start: &str) -> bool;
}

impl StrExt for str {
    fn ends_with_ignore_case(&self, end: &str) -> bool {
        self.len() >= end.len()
            && self.is_char_boundary(self.len() - end.len())
            && self[self.len() - end.len()..].eq_ignore_ascii_case(end)
    }

    fn starts_with_ignore_case(&self, start: &str) -> bool {
        self.len() >= start.len()
            && self.is_char_boundary(start.len())
            && self[..start.len()].eq_ignore_ascii_case(start)
    }
}
