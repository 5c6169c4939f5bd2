/// Append-only buffer of Jasmin assembly lines
/// Lines are never reordered or rewritten once written.
#[derive(Debug, Default)]
pub struct AsmWriter {
    lines: Vec<String>,
}

impl AsmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_inst(&mut self, inst: &str, args: &[&str]) {
        let mut line = format!("    {}", inst);
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.lines.push(line);
    }

    pub fn write_label(&mut self, label: &str) {
        self.lines.push(format!("{}:", label));
    }

    pub fn write_directive(&mut self, directive: &str, args: &[&str], indent: bool) {
        let mut line = if indent {
            format!("    .{}", directive)
        } else {
            format!(".{}", directive)
        };
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.lines.push(line);
    }

    pub fn write_comment(&mut self, comment: &str) {
        self.lines.push(format!("; {}", comment));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins the buffered lines into the final program text
    pub fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_each_line_kind() {
        let mut w = AsmWriter::new();
        w.write_directive("method", &["public", "static", "f(I)I"], false);
        w.write_directive("limit", &["stack", "32"], true);
        w.write_label("loop_start1");
        w.write_inst("iload_0", &[]);
        w.write_inst("if_icmpge", &["loop_end1"]);
        w.write_comment("done");
        assert_eq!(
            w.finish(),
            ".method public static f(I)I\n    .limit stack 32\nloop_start1:\n    iload_0\n    if_icmpge loop_end1\n; done\n"
        );
    }
}
