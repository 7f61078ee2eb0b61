// SPDX-License-Identifier: GPL-3.0

use mockito::{Matcher, Mock, Server, ServerGuard};
use pop_exporter::{Exporter, ExporterConfig, metrics::gather};
use serde_json::{Value, json};
use std::{net::SocketAddr, time::Duration};
use tokio_util::sync::CancellationToken;

const HEAD: &str = "0x00000000000000000000000000000000000000000000000000000000000000AA";
const FINALIZED: &str = "0x00000000000000000000000000000000000000000000000000000000000000BB";

/// Answer `method` called with exactly `params`.
async fn respond(server: &mut ServerGuard, method: &str, params: &str, result: Value) -> Mock {
	server
		.mock("POST", "/")
		.match_body(Matcher::AllOf(vec![
			Matcher::PartialJson(json!({ "jsonrpc": "2.0", "method": method })),
			Matcher::Regex(format!(r#""params":{}"#, regex_escape(params))),
		]))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string())
		.create_async()
		.await
}

fn regex_escape(params: &str) -> String {
	params.replace('[', r"\[").replace(']', r"\]")
}

fn block(number: &str, extrinsics: usize) -> Value {
	json!({
		"block": {
			"header": {
				"number": number,
				"parentHash": "0x00",
				"stateRoot": "0x00",
				"extrinsicsRoot": "0x00",
				"digest": { "logs": [] }
			},
			"extrinsics": vec!["0x280402000b"; extrinsics],
		},
		"justifications": null
	})
}

/// A node at block #3 (two extrinsics) with block #1 finalized.
async fn node() -> ServerGuard {
	let mut server = Server::new_async().await;
	respond(&mut server, "chain_getBlockHash", "[]", json!(HEAD)).await;
	respond(&mut server, "chain_getFinalizedHead", "[]", json!(FINALIZED)).await;
	let by_hash = |hash: &str| format!(r#"["{}"]"#, hash.to_lowercase());
	respond(&mut server, "chain_getBlock", &by_hash(HEAD), block("0x3", 2)).await;
	respond(&mut server, "chain_getBlock", &by_hash(FINALIZED), block("0x1", 1)).await;
	respond(&mut server, "system_name", "[]", json!("Parity Polkadot")).await;
	respond(&mut server, "system_version", "[]", json!("1.16.0-unknown")).await;
	respond(&mut server, "system_chain", "[]", json!("Development")).await;
	respond(
		&mut server,
		"system_health",
		"[]",
		json!({ "isSyncing": false, "peers": 4, "shouldHavePeers": true }),
	)
	.await;
	respond(
		&mut server,
		"state_getRuntimeVersion",
		"[]",
		json!({
			"specName": "polkadot",
			"implName": "parity-polkadot",
			"authoringVersion": 0,
			"specVersion": 1_016_000,
			"implVersion": 0,
			"transactionVersion": 26,
		}),
	)
	.await;
	respond(&mut server, "author_pendingExtrinsics", "[]", json!(["0x01", "0x02"])).await;
	server
}

fn free_addr() -> SocketAddr {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	listener.local_addr().unwrap()
}

#[tokio::test]
async fn serves_node_metrics() {
	let node = node().await;
	let listen_addr = free_addr();
	let config = ExporterConfig {
		rpc_url: node.url().parse().unwrap(),
		listen_addr,
		poll_interval: Duration::from_millis(50),
		..Default::default()
	};
	let shutdown = CancellationToken::new();
	let exporter = tokio::spawn(Exporter::new(config).unwrap().run(shutdown.clone()));

	let expected = [
		"polkadot_highest_block 3",
		"polkadot_blocks 1",
		"polkadot_extrinsics 2",
		"polkadot_final_block 1",
		"polkadot_finality_delay_blocks 2",
		r#"polkadot_system_info{chain="Development",name="Parity Polkadot",version="1.16.0-unknown"} 1"#,
		r#"specName="polkadot""#,
		"polkadot_node_peers 4",
		"polkadot_node_syncing 0",
		"polkadot_pending_extrinsics 2",
	];
	let mut body = String::new();
	for _ in 0..100 {
		tokio::time::sleep(Duration::from_millis(50)).await;
		let Ok(response) = reqwest::get(format!("http://{listen_addr}/metrics")).await else {
			continue;
		};
		body = response.text().await.unwrap();
		if expected.iter().all(|line| body.contains(line)) {
			break;
		}
	}
	for line in expected {
		assert!(body.contains(line), "missing `{line}` in:\n{body}");
	}
	assert!(!body.contains("transactionVersion"));

	shutdown.cancel();
	exporter.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_node_is_tallied_and_tolerated() {
	let config = ExporterConfig {
		// Use a port that's unlikely to have anything listening
		rpc_url: "http://127.0.0.1:19998".parse().unwrap(),
		request_timeout: Duration::from_secs(2),
		..Default::default()
	};
	let mut exporter = Exporter::new(config).unwrap();

	assert_eq!(exporter.step().await.unwrap(), 0);
	assert_eq!(exporter.step().await.unwrap(), 0);

	let text = String::from_utf8(gather(exporter.registry()).unwrap()).unwrap();
	assert!(!text.contains("polkadot_exporter_rpc_network_error 0"), "{text}");
	assert!(text.contains("polkadot_exporter_rpc_success 0"));
	assert!(text.contains("polkadot_blocks 0"));
}
