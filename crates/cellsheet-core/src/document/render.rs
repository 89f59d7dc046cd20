use super::Sheet;
use std::fmt;

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    ID |  Value | Contents")?;
        writeln!(f, "-------+--------+---------------")?;
        for id in self.ids() {
            if let Some(cell) = self.cells.get(&id) {
                writeln!(
                    f,
                    "{:>6} | {:>6} | '{}'",
                    id.as_str(),
                    cell.display_text(),
                    cell.contents()
                )?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Cell Dependencies")?;
        write!(f, "{}", self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let sheet = Sheet::new();
        assert_eq!(
            sheet.to_string(),
            "    ID |  Value | Contents\n\
             -------+--------+---------------\n\
             \n\
             Cell Dependencies\n\
             Upstream Links:\n\
             Downstream Links:\n"
        );
    }

    #[test]
    fn test_render_sorted_rows() {
        let mut sheet = Sheet::new();
        sheet.set_cell("B1", "2.0").unwrap();
        sheet.set_cell("A1", "=1.5 * B1").unwrap();
        sheet.set_cell("C1", "hello").unwrap();
        assert_eq!(
            sheet.to_string(),
            "    ID |  Value | Contents\n\
             -------+--------+---------------\n    \
             A1 |    3.0 | '=1.5 * B1'\n    \
             B1 |    2.0 | '2.0'\n    \
             C1 |  hello | 'hello'\n\
             \n\
             Cell Dependencies\n\
             Upstream Links:\n  \
             A1 : [B1]\n\
             Downstream Links:\n  \
             B1 : [A1]\n"
        );
    }
}
