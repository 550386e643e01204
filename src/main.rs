use std::{env, fs, process};

use cpcl_label::{
    decode, encode, Error, FixedPitchMetrics, ItemKind, LayoutItem, MarginSetting, PageGeometry,
    PaperSize, Printer, PrinterConfig,
};

//
// cargo run -- decode label.txt standard
// cargo run -- normalize label.txt 60x40 2 1 > clean.txt
// CPCL_PRINTER_VID=0x0A5F CPCL_PRINTER_PID=0x00D3 CPCL_PRINTER_SERIAL=XXQ22 cargo run -- send label.txt
//

fn print_usage() {
    println!("Usage: cpcl-label <COMMAND>");
    println!("Commands:");
    println!("  decode <file> [margin]                       List the items of a CPCL file");
    println!("  normalize <file> <paper> <margin> <copies>   Decode then re-encode to stdout");
    println!("  send <file>                                  Send a CPCL file to the USB printer");
    println!("\n<paper> is WxH in mm (60x40, 50x30, 40x30 ...).");
    println!("<margin> is none, narrow, standard or a value in mm.");
    println!("The printer is read from CPCL_PRINTER_VID, CPCL_PRINTER_PID and CPCL_PRINTER_SERIAL");
    println!("(a .env file is honored).");
}

fn main() {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["decode", file] => run_decode(file, MarginSetting::None),
        ["decode", file, margin] => margin.parse::<MarginSetting>().and_then(|m| run_decode(file, m)),
        ["normalize", file, paper, margin, copies] => run_normalize(file, paper, margin, copies),
        ["send", file] => run_send(file),
        ["--help"] | ["-h"] | [] => {
            print_usage();
            return;
        }
        _ => {
            eprintln!("Error: Unknown arguments {:?}", args);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn read_job(file: &str) -> Result<String, Error> {
    let bytes = fs::read(file)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run_decode(file: &str, margin: MarginSetting) -> Result<(), Error> {
    let job = read_job(file)?;
    let items = decode(&job, margin.mm(), &FixedPitchMetrics);

    for item in &items {
        println!("{}", describe(item));
    }
    println!("{} items", items.len());
    Ok(())
}

fn run_normalize(file: &str, paper: &str, margin: &str, copies: &str) -> Result<(), Error> {
    let paper: PaperSize = paper.parse()?;
    let margin: MarginSetting = margin.parse()?;
    let copies: u32 = copies
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("copies '{}' is not a number", copies)))?;
    let geometry = PageGeometry::new(paper, margin).copies(copies);

    let job = read_job(file)?;
    let items = decode(&job, geometry.margin_mm(), &FixedPitchMetrics);
    print!("{}", encode(&items, &geometry)?);
    Ok(())
}

fn run_send(file: &str) -> Result<(), Error> {
    let config = printer_from_env()?;
    let job = read_job(file)?;

    let printer = Printer::open(config)?;
    let n = printer.send(&job)?;
    println!("Sent {} bytes to {}", n, printer.config().serial);
    Ok(())
}

fn printer_from_env() -> Result<PrinterConfig, Error> {
    let vendor_id = usb_id_from_env("CPCL_PRINTER_VID")?;
    let product_id = usb_id_from_env("CPCL_PRINTER_PID")?;
    let serial = env::var("CPCL_PRINTER_SERIAL")
        .map_err(|_| Error::InvalidConfig("CPCL_PRINTER_SERIAL is not set".to_string()))?;
    Ok(PrinterConfig::new(vendor_id, product_id, serial))
}

fn usb_id_from_env(key: &str) -> Result<u16, Error> {
    let value =
        env::var(key).map_err(|_| Error::InvalidConfig(format!("{} is not set", key)))?;
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parsed.map_err(|_| Error::InvalidConfig(format!("{}={} is not a USB id", key, value)))
}

fn describe(item: &LayoutItem) -> String {
    match &item.kind {
        ItemKind::Text(t) => format!(
            "text  ({:.1}, {:.1}) {:.1}x{:.1} size {:.2}{} {:?}",
            item.x,
            item.y,
            item.width,
            item.height,
            t.font_size,
            if t.bold { " bold" } else { "" },
            t.content
        ),
        ItemKind::Qr(q) => format!(
            "qr    ({:.1}, {:.1}) {:.1}x{:.1} {:?}",
            item.x, item.y, item.width, item.height, q.content
        ),
    }
}
