//! ABI encoding helpers for dynamically typed contract calls.
//!
//! Contracts compiled at runtime have no generated bindings, so arguments
//! travel as [`DynSolValue`]s and are checked against the JSON ABI here.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi, Param},
    primitives::Bytes,
};

use crate::error::{AppError, Result};

/// Build contract-creation input: bytecode followed by the encoded constructor arguments.
pub fn encode_constructor(abi: &JsonAbi, bytecode: &Bytes, args: &[DynSolValue]) -> Result<Bytes> {
    let encoded_args = match &abi.constructor {
        Some(constructor) => {
            check_arity("constructor", &constructor.inputs, args)?;
            constructor
                .abi_encode_input(args)
                .map_err(|e| AppError::Abi(format!("constructor arguments: {}", e)))?
        }
        None if args.is_empty() => Vec::new(),
        None => {
            return Err(AppError::Abi(format!(
                "contract has no constructor but {} argument(s) were given",
                args.len()
            )))
        }
    };

    Ok([bytecode.as_ref(), encoded_args.as_slice()].concat().into())
}

/// Encode a call to `name`, picking the first overload that accepts `args`.
///
/// Returns the selected function together with the calldata (selector included).
pub fn encode_function<'a>(
    abi: &'a JsonAbi,
    name: &str,
    args: &[DynSolValue],
) -> Result<(&'a Function, Bytes)> {
    let overloads = abi
        .function(name)
        .ok_or_else(|| AppError::Abi(format!("function {} not found in the ABI", name)))?;

    let mut last_error = None;
    for function in overloads {
        if function.inputs.len() != args.len() {
            continue;
        }
        match function.abi_encode_input(args) {
            Ok(data) => return Ok((function, data.into())),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(AppError::Abi(match last_error {
        Some(e) => format!("arguments do not match {}: {}", name, e),
        None => format!("no overload of {} takes {} argument(s)", name, args.len()),
    }))
}

/// Decode the return data of `function`.
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<DynSolValue>> {
    function
        .abi_decode_output(data)
        .map_err(|e| AppError::Abi(format!("cannot decode output of {}: {}", function.name, e)))
}

/// Parse textual arguments against ABI parameter types.
///
/// `coerce_args(&f.inputs, &["5", "0xf39F..."])` yields values ready for
/// [`encode_function`].
pub fn coerce_args(params: &[Param], raw: &[&str]) -> Result<Vec<DynSolValue>> {
    if params.len() != raw.len() {
        return Err(AppError::Abi(format!(
            "expected {} argument(s), got {}",
            params.len(),
            raw.len()
        )));
    }

    params
        .iter()
        .zip(raw)
        .map(|(param, value)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| AppError::Abi(format!("unsupported type {}: {}", param.ty, e)))?;
            ty.coerce_str(value).map_err(|e| {
                AppError::Abi(format!("cannot parse {:?} as {}: {}", value, param.ty, e))
            })
        })
        .collect()
}

fn check_arity(name: &str, params: &[Param], args: &[DynSolValue]) -> Result<()> {
    if params.len() != args.len() {
        return Err(AppError::Abi(format!(
            "{} expects {} argument(s), got {}",
            name,
            params.len(),
            args.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    pub(crate) const ATTACK_ABI: &str = r#"[
        {"inputs":[{"internalType":"contract Wallet","name":"_wallet","type":"address"}],"stateMutability":"nonpayable","type":"constructor"},
        {"inputs":[],"name":"attack","outputs":[],"stateMutability":"nonpayable","type":"function"},
        {"inputs":[{"internalType":"uint256","name":"x","type":"uint256"}],"name":"ret","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"nonpayable","type":"function"}
    ]"#;

    fn attack_abi() -> JsonAbi {
        serde_json::from_str(ATTACK_ABI).unwrap()
    }

    #[test]
    fn test_encode_function_selector_and_args() {
        let abi = attack_abi();
        let (function, data) =
            encode_function(&abi, "ret", &[DynSolValue::Uint(U256::from(5), 256)]).unwrap();

        assert_eq!(function.name, "ret");
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], function.selector().as_slice());
        assert_eq!(data[35], 5);
    }

    #[test]
    fn test_encode_function_unknown_name() {
        let abi = attack_abi();
        match encode_function(&abi, "withdraw", &[]) {
            Err(AppError::Abi(msg)) => assert!(msg.contains("withdraw")),
            other => panic!("Expected Abi error, got {:?}", other.map(|(_, d)| d)),
        }
    }

    #[test]
    fn test_encode_function_wrong_arity() {
        let abi = attack_abi();
        let result = encode_function(&abi, "ret", &[]);
        assert!(matches!(result, Err(AppError::Abi(_))));
    }

    #[test]
    fn test_encode_function_wrong_type() {
        let abi = attack_abi();
        let result = encode_function(&abi, "ret", &[DynSolValue::Bool(true)]);
        assert!(matches!(result, Err(AppError::Abi(_))));
    }

    #[test]
    fn test_decode_output_uint() {
        let abi = attack_abi();
        let function = &abi.function("ret").unwrap()[0];
        let data = U256::from(1342).to_be_bytes::<32>();

        let values = decode_output(function, &data).unwrap();
        assert_eq!(values, vec![DynSolValue::Uint(U256::from(1342), 256)]);
    }

    #[test]
    fn test_encode_constructor_appends_args() {
        let abi = attack_abi();
        let bytecode = Bytes::from(vec![0x60, 0x80, 0x60, 0x40]);
        let wallet = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

        let input = encode_constructor(&abi, &bytecode, &[DynSolValue::Address(wallet)]).unwrap();

        assert_eq!(input.len(), 4 + 32);
        assert_eq!(&input[..4], bytecode.as_ref());
        assert_eq!(&input[16..], wallet.as_slice());
    }

    #[test]
    fn test_encode_constructor_without_constructor() {
        let abi = JsonAbi::new();
        let bytecode = Bytes::from(vec![0x60, 0x80]);

        assert_eq!(encode_constructor(&abi, &bytecode, &[]).unwrap(), bytecode);
        assert!(matches!(
            encode_constructor(&abi, &bytecode, &[DynSolValue::Bool(true)]),
            Err(AppError::Abi(_))
        ));
    }

    #[test]
    fn test_coerce_args_from_strings() {
        let abi = attack_abi();
        let ret = &abi.function("ret").unwrap()[0];
        let values = coerce_args(&ret.inputs, &["5"]).unwrap();
        assert_eq!(values, vec![DynSolValue::Uint(U256::from(5), 256)]);

        let constructor = abi.constructor.as_ref().unwrap();
        let values =
            coerce_args(&constructor.inputs, &["0x5FbDB2315678afecb367f032d93F642f64180aa3"])
                .unwrap();
        assert_eq!(
            values,
            vec![DynSolValue::Address(address!("5FbDB2315678afecb367f032d93F642f64180aa3"))]
        );
    }

    #[test]
    fn test_coerce_args_errors() {
        let abi = attack_abi();
        let ret = &abi.function("ret").unwrap()[0];
        assert!(matches!(coerce_args(&ret.inputs, &[]), Err(AppError::Abi(_))));
        assert!(matches!(coerce_args(&ret.inputs, &["five"]), Err(AppError::Abi(_))));
    }
}
