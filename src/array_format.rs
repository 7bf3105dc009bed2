//! numpy-style array rendering.
//!
//! Arrays with more elements than `threshold` are summarized: along every axis
//! only `edge_items` entries are kept at each end, with `...` in between.
//! Rows wrap at `line_width`, and every continuation line is indented by one
//! space per nesting level plus the width of `prefix`, so the text lines up
//! when it is printed after `prefix`.
//!
//! Floats keep at most 8 fractional digits and switch to scientific notation
//! when the shown magnitudes span too wide a range.
use half::{bf16, f16};
use ndarray::{ArrayViewD, Axis};
use serde::{Deserialize, Serialize};

const SUMMARY_INSERT: &str = "...";
const SEPARATOR: &str = " ";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayFormatOptions {
    pub threshold: usize,
    pub edge_items: usize,
    pub line_width: usize,
    pub prefix: String,
}

impl Default for ArrayFormatOptions {
    fn default() -> Self {
        Self {
            threshold: 1000,
            edge_items: 3,
            line_width: 75,
            prefix: String::new(),
        }
    }
}

/// Element types that can be laid out by [`array2string`].
pub trait FormatElement: Clone {
    /// Layout shared by every element of one array.
    type Format;

    /// Derives the layout from the elements that will actually be shown.
    fn element_format(shown: &[Self], scalar: bool) -> Self::Format;

    fn format_element(&self, format: &Self::Format) -> String;
}

macro_rules! impl_format_element_int {
    ($($a:ident),*) => {
        $(
            impl FormatElement for $a {
                type Format = usize;

                fn element_format(shown: &[Self], _scalar: bool) -> usize {
                    shown.iter().map(|x| x.to_string().len()).max().unwrap_or(0)
                }

                fn format_element(&self, width: &usize) -> String {
                    format!("{:>width$}", self, width = *width)
                }
            }
        )*
    };
}

impl_format_element_int!(u64, i64, u32, i32, u16, i16, u8, i8);

impl FormatElement for bool {
    /// Whether `True` gets a leading space to line up with `False`.
    type Format = bool;

    fn element_format(_shown: &[Self], scalar: bool) -> bool {
        !scalar
    }

    fn format_element(&self, pad_true: &bool) -> String {
        match (*self, *pad_true) {
            (true, true) => " True".to_string(),
            (true, false) => "True".to_string(),
            (false, _) => "False".to_string(),
        }
    }
}

/// Fractional digits kept before rounding.
const FLOAT_PRECISION: usize = 8;

/// A float widened to `f64`, together with the shortest `f64` that prints
/// the digits identifying it in its own type.
#[derive(Clone, Copy, Debug)]
pub struct FloatValue {
    exact: f64,
    shortest: f64,
}

impl FloatValue {
    fn new(exact: f64, round_trips: impl Fn(f64) -> bool) -> Self {
        let shortest = (0..17)
            .filter_map(|digits| format!("{:.*e}", digits, exact).parse::<f64>().ok())
            .find(|x| round_trips(*x))
            .unwrap_or(exact);
        Self { exact, shortest }
    }
}

fn trim_fraction_zeros(s: &str) -> String {
    let mut s = if s.contains('.') { s.trim_end_matches('0').to_string() } else { s.to_string() };
    if !s.contains('.') {
        s.push('.');
    }
    s
}

fn fraction_len(s: &str) -> usize {
    s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// Shortest positional digits, rounded to `precision` fractional digits.
fn positional(value: FloatValue, precision: usize) -> String {
    let shortest = value.shortest.to_string();
    if fraction_len(&shortest) > precision {
        trim_fraction_zeros(&format!("{:.*}", precision, value.exact))
    } else {
        trim_fraction_zeros(&shortest)
    }
}

/// Shortest scientific mantissa (rounded to `precision` fractional digits)
/// and decimal exponent.
fn scientific(value: FloatValue, precision: usize) -> (String, i32) {
    let mut s = format!("{:e}", value.shortest);
    if s.split_once('e').is_some_and(|(mantissa, _)| fraction_len(mantissa) > precision) {
        s = format!("{:.*e}", precision, value.exact);
    }
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    (trim_fraction_zeros(mantissa), exponent.parse().unwrap_or(0))
}

fn exponent_digits(exponent: i32) -> usize {
    exponent.unsigned_abs().to_string().len().max(2)
}

/// Shared float layout: positional or scientific, with the integer part
/// right-aligned and the fraction left-aligned across the array.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatFormat {
    scientific: bool,
    precision: usize,
    pad_left: usize,
    pad_right: usize,
    exp_size: usize,
}

impl FloatFormat {
    pub fn new(values: &[FloatValue]) -> Self {
        let finite: Vec<FloatValue> = values.iter().copied().filter(|x| x.exact.is_finite()).collect();
        let range = finite
            .iter()
            .map(|x| x.exact.abs())
            .filter(|x| *x != 0.0)
            .fold(None, |acc: Option<(f64, f64)>, x| match acc {
                Some((min, max)) => Some((min.min(x), max.max(x))),
                None => Some((x, x)),
            });
        let scientific_notation = match range {
            Some((min, max)) => max >= 1e8 || min < 1e-4 || max / min > 1e3,
            None => false,
        };

        let mut format = FloatFormat {
            scientific: scientific_notation,
            precision: FLOAT_PRECISION,
            pad_left: 0,
            pad_right: 0,
            exp_size: 0,
        };
        if scientific_notation {
            let parts: Vec<(String, i32)> = finite.iter().map(|x| scientific(*x, FLOAT_PRECISION)).collect();
            format.precision = parts.iter().map(|(m, _)| fraction_len(m)).max().unwrap_or(0);
            format.pad_left = parts.iter().map(|(m, _)| m.len() - fraction_len(m) - 1).max().unwrap_or(0);
            format.exp_size = parts.iter().map(|(_, e)| exponent_digits(*e)).max().unwrap_or(2);
            // Sign and `e` of the exponent, plus its digits and the fraction.
            format.pad_right = format.exp_size + 2 + format.precision;
        } else {
            let words: Vec<String> = finite.iter().map(|x| positional(*x, FLOAT_PRECISION)).collect();
            format.pad_left = words.iter().map(|w| w.len() - fraction_len(w) - 1).max().unwrap_or(0);
            format.pad_right = words.iter().map(|w| fraction_len(w)).max().unwrap_or(0);
        }

        if finite.len() != values.len() {
            let neg_inf = values.iter().any(|x| x.exact == f64::NEG_INFINITY);
            let offset = format.pad_right + 1;
            let widest = if neg_inf { 4 } else { 3 };
            format.pad_left = format.pad_left.max(widest - offset.min(widest));
        }
        format
    }

    pub fn format(&self, value: FloatValue) -> String {
        let x = value.exact;
        if !x.is_finite() {
            let word = if x.is_nan() {
                "nan"
            } else if x < 0.0 {
                "-inf"
            } else {
                "inf"
            };
            return format!("{:>width$}", word, width = self.pad_left + self.pad_right + 1);
        }
        if self.scientific {
            let (mantissa, exponent) = scientific(value, self.precision);
            let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa.as_str(), ""));
            format!(
                "{:>pl$}.{:0<prec$}e{}{:0>es$}",
                int_part,
                frac_part,
                if exponent < 0 { '-' } else { '+' },
                exponent.unsigned_abs(),
                pl = self.pad_left,
                prec = self.precision,
                es = self.exp_size
            )
        } else {
            let word = positional(value, self.precision);
            let (int_part, frac_part) = word.split_once('.').unwrap_or((word.as_str(), ""));
            format!("{:>pl$}.{:<pr$}", int_part, frac_part, pl = self.pad_left, pr = self.pad_right)
        }
    }
}

macro_rules! impl_format_element_float {
    ($a:ident, |$x:ident| $exact:expr, |$y:ident| $round_trips:expr) => {
        impl FormatElement for $a {
            type Format = FloatFormat;

            fn element_format(shown: &[Self], _scalar: bool) -> FloatFormat {
                let values: Vec<FloatValue> = shown.iter().map(|x| x.float_value()).collect();
                FloatFormat::new(&values)
            }

            fn format_element(&self, format: &FloatFormat) -> String {
                format.format(self.float_value())
            }
        }

        impl FloatElement for $a {
            fn float_value(&self) -> FloatValue {
                let $x = *self;
                FloatValue::new($exact, |$y| $round_trips)
            }
        }
    };
}

trait FloatElement {
    fn float_value(&self) -> FloatValue;
}

impl_format_element_float!(f64, |x| x, |y| y == x);
impl_format_element_float!(f32, |x| x as f64, |y| y as f32 == x);
impl_format_element_float!(f16, |x| x.to_f64(), |y| f16::from_f64(y) == x);
impl_format_element_float!(bf16, |x| x.to_f64(), |y| bf16::from_f64(y) == x);

/// `(leading, trailing, summarized)` counts for an axis of length `len`.
fn axis_items(len: usize, summarize: bool, edge_items: usize) -> (usize, usize, bool) {
    if summarize && 2 * edge_items < len {
        (edge_items, edge_items, true)
    } else {
        (0, len, false)
    }
}

fn collect_shown<T: FormatElement>(view: ArrayViewD<'_, T>, summarize: bool, edge_items: usize, out: &mut Vec<T>) {
    if view.ndim() == 0 {
        out.extend(view.iter().cloned());
        return;
    }
    let len = view.len_of(Axis(0));
    let (leading, trailing, _) = axis_items(len, summarize, edge_items);
    for i in (0..leading).chain(len - trailing..len) {
        collect_shown(view.index_axis(Axis(0), i), summarize, edge_items, out);
    }
}

fn extend_line(s: &mut String, line: &mut String, word: &str, line_width: usize, next_line_prefix: &str) {
    let needs_wrap = line.len() + word.len() > line_width && line.len() > next_line_prefix.len();
    if needs_wrap {
        s.push_str(line.trim_end());
        s.push('\n');
        line.clear();
        line.push_str(next_line_prefix);
    }
    line.push_str(word);
}

struct Layout<'a, F> {
    summarize: bool,
    edge_items: usize,
    format: &'a F,
}

fn format_axis<T: FormatElement>(view: ArrayViewD<'_, T>, hanging_indent: &str, curr_width: usize, layout: &Layout<'_, T::Format>) -> String {
    if view.ndim() == 0 {
        return view.iter().next().map(|x| x.format_element(layout.format)).unwrap_or_default();
    }

    let next_hanging_indent = format!("{} ", hanging_indent);
    let next_width = curr_width.saturating_sub(1);
    let len = view.len_of(Axis(0));
    let (leading, trailing, show_summary) = axis_items(len, layout.summarize, layout.edge_items);
    let nested = |i: usize| format_axis(view.index_axis(Axis(0), i), &next_hanging_indent, next_width, layout);

    let mut s = String::new();
    if view.ndim() == 1 {
        // Leave room for the closing bracket.
        let elem_width = curr_width.saturating_sub(1);
        let mut line = hanging_indent.to_string();
        for i in 0..leading {
            extend_line(&mut s, &mut line, &nested(i), elem_width, hanging_indent);
            line.push_str(SEPARATOR);
        }
        if show_summary {
            extend_line(&mut s, &mut line, SUMMARY_INSERT, elem_width, hanging_indent);
            line.push_str(SEPARATOR);
        }
        for i in len - trailing..len - 1 {
            extend_line(&mut s, &mut line, &nested(i), elem_width, hanging_indent);
            line.push_str(SEPARATOR);
        }
        extend_line(&mut s, &mut line, &nested(len - 1), elem_width, hanging_indent);
        s.push_str(&line);
    } else {
        let line_sep = "\n".repeat(view.ndim() - 1);
        for i in 0..leading {
            s.push_str(hanging_indent);
            s.push_str(&nested(i));
            s.push_str(&line_sep);
        }
        if show_summary {
            s.push_str(hanging_indent);
            s.push_str(SUMMARY_INSERT);
            s.push_str(&line_sep);
        }
        for i in len - trailing..len - 1 {
            s.push_str(hanging_indent);
            s.push_str(&nested(i));
            s.push_str(&line_sep);
        }
        s.push_str(hanging_indent);
        s.push_str(&nested(len - 1));
    }
    format!("[{}]", &s[hanging_indent.len()..])
}

pub fn array2string<T: FormatElement>(view: ArrayViewD<'_, T>, options: &ArrayFormatOptions) -> String {
    if view.ndim() > 0 && view.is_empty() {
        return "[]".to_string();
    }
    let summarize = view.len() > options.threshold;

    let mut shown = Vec::new();
    collect_shown(view.view(), summarize, options.edge_items, &mut shown);
    let format = T::element_format(&shown, view.ndim() == 0);
    let layout = Layout { summarize, edge_items: options.edge_items, format: &format };

    let next_line_prefix = " ".repeat(1 + options.prefix.chars().count());
    format_axis(view, &next_line_prefix, options.line_width, &layout)
}
