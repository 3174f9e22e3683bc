use elgato_hd60_linux::{Hd60Device, Hd60Error};

fn print_usage() {
    println!("Elgato HD60 S+/X HDR Controller - USB Control Tool\n");
    println!("USAGE:");
    println!("    sudo elgato-hd60-linux [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --hdr-status                Report whether the HDMI source is HDR or SDR\n");
    println!("    --frame                     Dump the raw HDMI Dynamic-Range InfoFrame\n");
    println!("    --tonemap <VALUE>           Set hardware HDR-to-SDR tonemapping");
    println!("                                Values: on, off\n");
    println!("    --help, -h                  Show this help message\n");
    println!("EXAMPLES:");
    println!("    sudo elgato-hd60-linux --hdr-status");
    println!("    sudo elgato-hd60-linux --frame");
    println!("    sudo elgato-hd60-linux --tonemap on");
    println!("    sudo elgato-hd60-linux --hdr-status --tonemap off");
    println!("\nSUPPORTED DEVICES:");
    println!("    Elgato HD60 S+:  0fd9:006a");
    println!("    Elgato HD60 X:   0fd9:0082");
}

fn parse_on_off(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage();
        return Ok(());
    }

    let device = Hd60Device::open()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--hdr-status" => {
                match device.video_hdr_mode() {
                    Ok(mode) => println!("HDMI source: {}", mode),
                    Err(Hd60Error::ChecksumMismatch) => {
                        println!("HDMI source: unknown (corrupt HDR metadata)");
                    }
                    Err(e) => return Err(e.into()),
                }
                i += 1;
            }
            "--frame" => {
                let frame = device.hdmi_hdr_status_frame()?;
                print!("{}", frame);
                i += 1;
            }
            "--tonemap" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --tonemap requires a value");
                    return Err(Hd60Error::MissingArgumentValue("--tonemap".into()).into());
                }
                let value = &args[i + 1];
                match parse_on_off(value) {
                    Some(enable) => {
                        println!("Setting HDR tonemapping to {}", if enable { "on" } else { "off" });
                        device.set_hdr_tonemapping(enable)?;
                    }
                    None => {
                        eprintln!("Error: Invalid value '{}' for --tonemap", value);
                        eprintln!("Valid values: on, off");
                        return Err(Hd60Error::InvalidArgument {
                            arg: "--tonemap",
                            value: value.clone(),
                            valid: "on, off",
                        }.into());
                    }
                }
                i += 2;
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                return Err(Hd60Error::InvalidArgument {
                    arg: "option",
                    value: other.to_string(),
                    valid: "see --help",
                }.into());
            }
        }
    }

    Ok(())
}
