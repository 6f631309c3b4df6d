use alloy::{
    hex,
    primitives::{Address, B256, Bytes, U256, keccak256},
    sol,
    sol_types::{SolCall, SolError, SolValue},
};

sol! {
    struct BootstrapConfig {
        address module;
        bytes data;
    }

    struct BootstrapPreValidationHookConfig {
        uint256 hookType;
        address module;
        bytes data;
    }

    contract NexusBootstrap {
        function initNexusWithDefaultValidatorAndOtherModulesNoRegistry(
            bytes calldata defaultValidatorInitData,
            BootstrapConfig[] calldata validators,
            BootstrapConfig[] calldata executors,
            BootstrapConfig calldata hook,
            BootstrapConfig[] calldata fallbacks,
            BootstrapPreValidationHookConfig[] calldata preValidationHooks
        ) external;
    }

    contract NexusAccountFactory {
        function computeAccountAddress(bytes calldata initData, bytes32 salt) external view returns (address expectedAddress);
        function createAccount(bytes calldata initData, bytes32 salt) external payable returns (address);
        function createAccountWithName(bytes calldata initData, bytes32 salt, string calldata name) external payable returns (address);
    }

    /// Sophon Name Service registry (ERC-721 enumerable, one token per name)
    contract SnsRegistry {
        error ERC721NonexistentToken(uint256 tokenId);

        function baseDomain() external view returns (string);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function nameOf(uint256 tokenId) external view returns (string);
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

/// Salt for the `index`-th account of an owner: the index left-padded to 32 bytes.
pub fn salt_for_index(index: u64) -> B256 {
    B256::from(U256::from(index))
}

/// Bootstrap initializer with `owner` as the default validator's owner and no extra modules.
pub fn encode_bootstrap_call(owner: Address) -> Bytes {
    let call = NexusBootstrap::initNexusWithDefaultValidatorAndOtherModulesNoRegistryCall {
        defaultValidatorInitData: Bytes::copy_from_slice(owner.as_slice()),
        validators: Vec::new(),
        executors: Vec::new(),
        hook: BootstrapConfig {
            module: Address::ZERO,
            data: Bytes::copy_from_slice(B256::ZERO.as_slice()),
        },
        fallbacks: Vec::new(),
        preValidationHooks: Vec::new(),
    };
    Bytes::from(call.abi_encode())
}

/// Factory init data: abi.encode(address bootstrap, bytes bootstrapCall)
pub fn encode_init_data(bootstrap: Address, bootstrap_call: Bytes) -> Bytes {
    Bytes::from((bootstrap, bootstrap_call).abi_encode_params())
}

/// ENS-style name hash: fold keccak256 of each label from the right onto a zero root.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }
    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        keccak256(buf)
    })
}

/// Registry token id for a fully qualified name.
pub fn name_token_id(full_name: &str) -> U256 {
    U256::from_be_bytes(namehash(full_name).0)
}

/// Decode EVM revert data into a human-readable error name.
pub fn decode_revert_data(data: &[u8]) -> String {
    if data.len() < 4 {
        return format!("unknown revert data: 0x{}", hex::encode(data));
    }
    let selector = &data[..4];
    if selector == SnsRegistry::ERC721NonexistentToken::SELECTOR {
        return match SnsRegistry::ERC721NonexistentToken::abi_decode(data) {
            Ok(err) => format!("ERC721NonexistentToken({}): name is not registered", err.tokenId),
            Err(_) => "ERC721NonexistentToken: name is not registered".into(),
        };
    }
    // Error(string)
    if selector == [0x08, 0xc3, 0x79, 0xa0] {
        return match String::abi_decode(&data[4..]) {
            Ok(msg) => format!("revert: \"{msg}\""),
            Err(_) => format!("Error(string), data: 0x{}", hex::encode(data)),
        };
    }
    format!(
        "unknown error selector 0x{} (data: 0x{})",
        hex::encode(selector),
        hex::encode(data)
    )
}
