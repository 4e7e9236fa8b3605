//! Output layout hooks.
//!
//! Every structural boundary the generator emits goes through a
//! [`PrettyPrinter`] callback, so layout (compact, indented, or custom) is
//! fully decoupled from correctness. The generator owns legality and
//! escaping; printers only append layout text.

/// Callbacks at each structural boundary of the generated document.
///
/// `entries` in the end callbacks is the number of entries written, letting
/// an indenting printer keep `{}` / `[]` compact.
pub trait PrettyPrinter {
    /// Between consecutive root-level values.
    fn root_separator(&mut self, out: &mut String);
    /// The `{` of an object.
    fn start_object(&mut self, out: &mut String);
    /// The `}` of an object.
    fn end_object(&mut self, out: &mut String, entries: i64);
    /// Between the `{` and the first member name.
    fn before_object_entries(&mut self, out: &mut String);
    /// Between a member value and the next member name.
    fn object_entry_separator(&mut self, out: &mut String);
    /// Between a member name and its value.
    fn name_value_separator(&mut self, out: &mut String);
    /// The `[` of an array.
    fn start_array(&mut self, out: &mut String);
    /// The `]` of an array.
    fn end_array(&mut self, out: &mut String, values: i64);
    /// Between the `[` and the first value.
    fn before_array_values(&mut self, out: &mut String);
    /// Between consecutive array values.
    fn array_value_separator(&mut self, out: &mut String);
}

/// Compact layout: no whitespace anywhere, a configurable separator between
/// root values.
#[derive(Debug, Clone)]
pub struct MinimalPrettyPrinter {
    /// Written between consecutive root-level values.
    pub root_separator: String,
}

impl Default for MinimalPrettyPrinter {
    fn default() -> Self {
        MinimalPrettyPrinter {
            root_separator: " ".to_owned(),
        }
    }
}

impl PrettyPrinter for MinimalPrettyPrinter {
    fn root_separator(&mut self, out: &mut String) {
        out.push_str(&self.root_separator);
    }

    fn start_object(&mut self, out: &mut String) {
        out.push('{');
    }

    fn end_object(&mut self, out: &mut String, _entries: i64) {
        out.push('}');
    }

    fn before_object_entries(&mut self, _out: &mut String) {}

    fn object_entry_separator(&mut self, out: &mut String) {
        out.push(',');
    }

    fn name_value_separator(&mut self, out: &mut String) {
        out.push(':');
    }

    fn start_array(&mut self, out: &mut String) {
        out.push('[');
    }

    fn end_array(&mut self, out: &mut String, _values: i64) {
        out.push(']');
    }

    fn before_array_values(&mut self, _out: &mut String) {}

    fn array_value_separator(&mut self, out: &mut String) {
        out.push(',');
    }
}

/// Indented layout: one entry per line, two-space indent, `" : "` between
/// names and values, empty containers kept on one line.
#[derive(Debug, Clone)]
pub struct DefaultPrettyPrinter {
    indent: String,
    depth: usize,
}

impl Default for DefaultPrettyPrinter {
    fn default() -> Self {
        DefaultPrettyPrinter {
            indent: "  ".to_owned(),
            depth: 0,
        }
    }
}

impl DefaultPrettyPrinter {
    /// An indenting printer using `indent` per nesting level.
    #[must_use]
    pub fn with_indent(indent: &str) -> Self {
        DefaultPrettyPrinter {
            indent: indent.to_owned(),
            depth: 0,
        }
    }

    fn newline(&self, out: &mut String) {
        out.push('\n');
        for _ in 0..self.depth {
            out.push_str(&self.indent);
        }
    }
}

impl PrettyPrinter for DefaultPrettyPrinter {
    fn root_separator(&mut self, out: &mut String) {
        out.push('\n');
    }

    fn start_object(&mut self, out: &mut String) {
        out.push('{');
        self.depth += 1;
    }

    fn end_object(&mut self, out: &mut String, entries: i64) {
        self.depth = self.depth.saturating_sub(1);
        if entries > 0 {
            self.newline(out);
        }
        out.push('}');
    }

    fn before_object_entries(&mut self, out: &mut String) {
        self.newline(out);
    }

    fn object_entry_separator(&mut self, out: &mut String) {
        out.push(',');
        self.newline(out);
    }

    fn name_value_separator(&mut self, out: &mut String) {
        out.push_str(" : ");
    }

    fn start_array(&mut self, out: &mut String) {
        out.push('[');
        self.depth += 1;
    }

    fn end_array(&mut self, out: &mut String, values: i64) {
        self.depth = self.depth.saturating_sub(1);
        if values > 0 {
            self.newline(out);
        }
        out.push(']');
    }

    fn before_array_values(&mut self, out: &mut String) {
        self.newline(out);
    }

    fn array_value_separator(&mut self, out: &mut String) {
        out.push(',');
        self.newline(out);
    }
}
