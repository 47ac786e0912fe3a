//! Light-client bridge contract ABI definition
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the bridge
//! contract on the destination chain.

use alloy::sol;

sol! {
    /// Destination-chain contract holding the light-client view of the
    /// source chain's headers.
    contract LightClientBridge {
        /// Highest source-chain height the bridge has verified.
        function syncedHeight() external view returns (uint256);

        /// Append a batch of encoded source headers to the light client.
        /// `headers` holds the encoded headers concatenated in ascending
        /// height order.
        function syncHeaders(bytes calldata headers) external;
    }
}
