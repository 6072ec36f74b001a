#![allow(clippy::uninlined_format_args)]

use relinear::{backends, Error, Flags, Match, Regex, Subject, Text};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "relinear-tool")]
struct Opt {
    /// The regular expression.
    pattern: String,

    /// The flags of the regular expression.
    #[structopt(long, short, parse(from_str = Flags::from))]
    flags: Option<Flags>,

    /// Dump the IR to stdout.
    #[structopt(long)]
    dump_ir: bool,

    /// Dump the compiled program to stdout.
    #[structopt(long)]
    dump_program: bool,

    /// Dump all regular expression compilation phases to stdout.
    #[structopt(long)]
    dump_phases: bool,

    /// Match against UTF-16 text instead of a UTF-8 string.
    #[structopt(long)]
    utf16: bool,

    /// The input values to match against.
    #[structopt(conflicts_with_all = &["bench", "file"])]
    inputs: Vec<String>,

    /// Match against the contents of a specified file.
    #[structopt(long, conflicts_with_all = &["bench", "inputs"])]
    file: Option<PathBuf>,

    /// Benchmark the matches of the specified file over each kind of subject,
    /// and report where byte and text results differ.
    #[structopt(long, conflicts_with_all = &["file", "inputs"])]
    bench: Option<PathBuf>,

    /// The number of timed runs per subject when benchmarking.
    #[structopt(long, default_value = "25")]
    runs: usize,
}

fn format_match<T: Subject + ?Sized>(m: &Match<T>) -> String
where
    T::Native: std::fmt::Debug,
{
    let mut result = format!("{:?} ({}..{})", m.as_slice(), m.start(), m.end());
    if m.captures.is_empty() {
        return result;
    }
    result.push_str(", captures: [");
    for group in m.groups().skip(1) {
        if group.index > 1 {
            result.push_str(", ");
        }
        if let Some(name) = group.name {
            result.push_str(&format!("{}: ", name));
        }
        match m.group_slice(group.index) {
            Some(slice) => {
                let range = group.range.unwrap_or_default();
                result.push_str(&format!("{:?} ({}..{})", slice, range.start, range.end));
            }
            None => result.push_str("None"),
        }
    }
    result.push(']');
    result
}

fn exec_re<T: Subject + ?Sized>(re: &Regex, subject: &T)
where
    T::Native: std::fmt::Debug,
{
    let mut matches = re.find_iter(subject);
    if let Some(res) = matches.next() {
        let count = 1 + matches.count();
        println!("Match: {}, total: {}", format_match(&res), count);
    } else {
        println!("No match");
    }
}

fn exec_re_on_string(re: &Regex, input: &str, utf16: bool) {
    if utf16 {
        let units: Vec<u16> = input.encode_utf16().collect();
        exec_re(re, &Text::new(&units));
    } else {
        exec_re(re, input);
    }
}

/// \return the median of some durations, in milliseconds.
fn median_ms(mut times: Vec<Duration>) -> f64 {
    if times.is_empty() {
        return f64::NAN;
    }
    times.sort();
    let mid = times.len() / 2;
    let median = if times.len() % 2 == 1 {
        times[mid]
    } else {
        (times[mid - 1] + times[mid]) / 2
    };
    median.as_secs_f64() * 1000.0
}

/// Time \p runs executions of \p f, returning the median and the last result.
fn time_runs<R, F: FnMut() -> R>(runs: usize, mut f: F) -> (f64, R) {
    // Warmup
    let mut result = f();
    let mut times = Vec::with_capacity(runs);
    for _ in 0..runs {
        let start = Instant::now();
        result = f();
        times.push(start.elapsed());
    }
    (median_ms(times), result)
}

fn bench_re_on_path(pattern: &str, flags: Flags, path: &Path, runs: usize) -> Result<(), Error> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("{}: {}", err, path.display());
            return Ok(());
        }
    };
    let string = String::from_utf8_lossy(&bytes).into_owned();
    let utf16: Vec<u16> = string.encode_utf16().collect();
    println!("Text length: {} bytes, {} UTF-16 units", bytes.len(), utf16.len());

    let byte_re = Regex::with_flags(
        pattern,
        Flags {
            latin1: true,
            ..flags
        },
    )?;
    let text_re = Regex::with_flags(pattern, flags)?;

    let (str_first, str_match) = time_runs(runs, || text_re.find(string.as_str()).map(|m| m.range()));
    let (byte_first, byte_match) = time_runs(runs, || byte_re.find(&bytes[..]).map(|m| m.range()));
    let (text_first, text_value) = time_runs(runs, || {
        let text = Text::new(&utf16);
        let value = text_re.find(&text).map(|m| String::from_utf16_lossy(m.as_slice()));
        value
    });

    let (str_all, str_count) = time_runs(runs, || text_re.find_iter(string.as_str()).count());
    let (byte_all, byte_count) = time_runs(runs, || byte_re.find_iter(&bytes[..]).count());
    let (text_all, text_count) = time_runs(runs, || text_re.find_iter(&Text::new(&utf16)).count());

    println!("Subject|First match|All matches|Count");
    println!("---|---:|---:|---:");
    println!("bytes (latin1)|{:.3} ms|{:.3} ms|{}", byte_first, byte_all, byte_count);
    println!("str|{:.3} ms|{:.3} ms|{}", str_first, str_all, str_count);
    println!("UTF-16 text|{:.3} ms|{:.3} ms|{}", text_first, text_all, text_count);

    let byte_value = byte_match.map(|r| String::from_utf8_lossy(&bytes[r]).into_owned());
    let str_value = str_match.map(|r| string[r].to_string());
    if byte_value != str_value {
        println!("First match differs between bytes and str; this may be due to non-ASCII characters.");
        println!("\tbytes: {:?}", byte_value);
        println!("\tstr:   {:?}", str_value);
    }
    if str_value != text_value {
        println!("First match differs between str and UTF-16 text.");
        println!("\tstr:  {:?}", str_value);
        println!("\ttext: {:?}", text_value);
    }
    if byte_count != str_count || str_count != text_count {
        println!("Match counts differ between subjects.");
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Opt::from_args();

    let flags = args.flags.unwrap_or_default();
    let ire = backends::try_parse(&args.pattern, flags)?;
    if args.dump_phases || args.dump_ir {
        println!("IR:\n{}", ire);
    }

    let prog = backends::emit(&ire)?;
    if args.dump_phases || args.dump_program {
        println!("Program:\n{}", prog);
    }

    if let Some(ref path) = args.bench {
        return bench_re_on_path(&args.pattern, flags, path, args.runs);
    }

    let re = Regex::with_flags(&args.pattern, flags)?;
    if let Some(ref path) = args.file {
        match fs::read_to_string(path) {
            Ok(contents) => exec_re_on_string(&re, contents.as_str(), args.utf16),
            Err(err) => println!("{}: {}", err, path.display()),
        };
    } else {
        for input in args.inputs {
            exec_re_on_string(&re, &input, args.utf16);
        }
    }
    Ok(())
}
