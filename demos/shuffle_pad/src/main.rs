use argh::FromArgs;
use dovetail::{
    tensor::{CpuAllocator, Tensor},
    tensor_ops::{pad, pixel_shuffle, pixel_unshuffle, Padding},
};

/// Comma-separated padding values, `left,right` or `left,right,top,bottom`.
#[derive(Debug, Clone, PartialEq)]
struct PaddingArg(Vec<usize>);

/// Rescales a tensor with pixel shuffle and pads the result
#[derive(Debug, FromArgs)]
struct Args {
    /// input shape as b,c,h,w
    #[argh(option, short = 's', default = "[1, 8, 3, 3]", from_str_fn(parse_shape))]
    shape: [usize; 4],

    /// the upscale factor
    #[argh(option, short = 'r', default = "2")]
    upscale_factor: usize,

    /// padding as left,right or left,right,top,bottom
    #[argh(
        option,
        short = 'p',
        default = "PaddingArg(vec![1, 1, 1, 1])",
        from_str_fn(parse_padding)
    )]
    padding: PaddingArg,

    /// the fill value of the padded border
    #[argh(option, short = 'v', default = "0.0")]
    value: f32,
}

fn parse_list(value: &str) -> Result<Vec<usize>, String> {
    value
        .split(',')
        .map(|v| v.trim().parse::<usize>().map_err(|e| format!("{v}: {e}")))
        .collect()
}

fn parse_padding(value: &str) -> Result<PaddingArg, String> {
    parse_list(value).map(PaddingArg)
}

fn parse_shape(value: &str) -> Result<[usize; 4], String> {
    let dims = parse_list(value)?;
    dims.as_slice()
        .try_into()
        .map_err(|_| format!("expected 4 dimensions, got {}", dims.len()))
}

/// Shuffle, unshuffle and pad a generated tensor, returning the padded result.
fn run(args: &Args) -> Result<Tensor<f32, 4>, Box<dyn std::error::Error>> {
    let padding = Padding::from_slice(&args.padding.0)?;

    let [_, cs, hs, ws] = args.shape;
    let x = Tensor::<f32, 4>::from_shape_fn(args.shape, CpuAllocator, |[b, c, h, w]| {
        (((b * cs + c) * hs + h) * ws + w) as f32
    })?;
    log::info!("input {:?}", x.shape);

    let upscaled = pixel_shuffle(&x, args.upscale_factor)?;
    println!("pixel_shuffle: {:?} -> {:?}", x.shape, upscaled.shape);

    let restored = pixel_unshuffle(&upscaled, args.upscale_factor)?;
    if restored.as_slice() != x.as_slice() {
        return Err("pixel_unshuffle did not restore the input".into());
    }
    println!(
        "pixel_unshuffle: {:?} -> {:?}",
        upscaled.shape, restored.shape
    );

    let padded = pad(&upscaled, &args.padding.0, args.value)?;
    println!("pad {:?}: {:?} -> {:?}", padding, upscaled.shape, padded.shape);

    Ok(padded)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let padded = run(&args)?;

    if padded.numel() > 0 {
        println!("first row: {:?}", &padded.as_slice()[..padded.shape[3]]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() -> Result<(), String> {
        assert_eq!(parse_shape("1, 8,3,3")?, [1, 8, 3, 3]);
        assert!(parse_shape("1,8,3").is_err());
        assert_eq!(parse_padding("1,2,3,4")?, PaddingArg(vec![1, 2, 3, 4]));
        assert!(parse_padding("1,x").is_err());
        Ok(())
    }

    #[test]
    fn test_args_from_command_line() {
        let args = Args::from_args(&["shuffle_pad"], &["-s", "2,4,2,3", "-p", "1,2", "-v", "9"])
            .map_err(|e| e.output);
        let args = match args {
            Ok(args) => args,
            Err(output) => panic!("{output}"),
        };
        assert_eq!(args.shape, [2, 4, 2, 3]);
        assert_eq!(args.padding, PaddingArg(vec![1, 2]));
        assert_eq!(args.upscale_factor, 2);
    }

    #[test]
    fn test_run() -> Result<(), Box<dyn std::error::Error>> {
        let args = Args {
            shape: [1, 8, 3, 3],
            upscale_factor: 2,
            padding: PaddingArg(vec![1, 1, 1, 1]),
            value: -1.0,
        };
        let padded = run(&args)?;
        assert_eq!(padded.shape, [1, 2, 8, 8]);
        assert_eq!(padded.get([0, 0, 0, 0]), Some(&-1.0));
        assert_eq!(padded.get([0, 0, 1, 1]), Some(&0.0));
        Ok(())
    }

    #[test]
    fn test_run_rejects_bad_padding() {
        let args = Args {
            shape: [1, 4, 2, 2],
            upscale_factor: 2,
            padding: PaddingArg(vec![1, 2, 3]),
            value: 0.0,
        };
        assert!(run(&args).is_err());
    }
}
