//! Integration tests for ledger construction, sealing and auditing

use std::sync::Arc;
use mediledger::blockchain::{validate_blocks, ChainFault, Ledger, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use mediledger::clock::ManualClock;
use mediledger::config::LedgerConfig;
use mediledger::error::LedgerError;
use mediledger::miner::{ProofOfWork, SearchLimits};

/// Helper to build a ledger with a deterministic clock
fn test_ledger(difficulty: usize) -> Result<Ledger, Box<dyn std::error::Error>> {
    let config = LedgerConfig {
        difficulty,
        ..LedgerConfig::default()
    };
    Ok(Ledger::from_config_with_clock(&config, Arc::new(ManualClock::ticking()))?)
}

fn mine(ledger: &mut Ledger) -> Result<(), Box<dyn std::error::Error>> {
    let last_proof = ledger.last_block()?.proof;
    let proof = ledger.solve_proof_of_work(last_proof)?;
    ledger.seal_block(proof, None)?;
    Ok(())
}

#[test]
fn test_genesis_invariant() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Ledger::new();

    assert_eq!(ledger.len(), 1);
    let genesis = ledger.last_block()?;
    assert_eq!(genesis.index, 1);
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    assert_eq!(genesis.proof, GENESIS_PROOF);
    assert!(ledger.pending().is_empty());
    assert!(ledger.validate_chain());

    Ok(())
}

#[test]
fn test_end_to_end_product_handoff() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::from_config_with_clock(
        &LedgerConfig::default(),
        Arc::new(ManualClock::ticking()),
    )?;

    let first = ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received")?;
    let second =
        ledger.queue_transaction("Distributor", "Pharmacy", "Product-1", "Ready for Transport")?;
    assert_eq!((first, second), (2, 2));

    let proof = ledger.solve_proof_of_work(100)?;
    let block = ledger.seal_block(proof, None)?;

    assert_eq!(ledger.len(), 2);
    assert_eq!(block.index, 2);
    assert_eq!(block.transactions.len(), 2);
    assert_eq!(block.transactions[0].sender, "Manufacturer");
    assert_eq!(block.transactions[0].recipient, "Distributor");
    assert_eq!(block.transactions[0].status, "Received");
    assert_eq!(block.transactions[1].sender, "Distributor");
    assert_eq!(block.transactions[1].recipient, "Pharmacy");
    assert_eq!(block.transactions[1].status, "Ready for Transport");
    assert!(block.transactions[0].created_at < block.transactions[1].created_at);

    let genesis = &ledger.blocks()[0];
    assert_eq!(block.previous_hash, genesis.content_hash());
    assert_eq!(block.previous_hash, Ledger::content_hash(genesis));
    assert!(ledger.pending().is_empty());
    assert!(ledger.validate_chain());

    // The exported view matches the chain field for field.
    let exported = ledger.export();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[1], block);

    Ok(())
}

#[test]
fn test_sealing_empty_buffer() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;
    mine(&mut ledger)?;

    let tip = ledger.last_block()?;
    assert_eq!(tip.index, 2);
    assert!(tip.transactions.is_empty());
    assert!(ledger.validate_chain());

    Ok(())
}

#[test]
fn test_link_invariant_over_many_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;

    for round in 0..6 {
        for n in 0..round {
            ledger.queue_transaction("Distributor", "Pharmacy", &format!("P-{}", n), "Shipped")?;
        }
        mine(&mut ledger)?;
    }

    assert_eq!(ledger.len(), 7);
    for (i, block) in ledger.blocks().iter().enumerate() {
        assert_eq!(block.index, i as u64 + 1);
    }
    for pair in ledger.blocks().windows(2) {
        assert_eq!(pair[1].previous_hash, pair[0].content_hash());
        assert!(ledger.is_valid_proof(pair[0].proof, pair[1].proof));
    }
    assert!(ledger.validate_chain());
    assert_eq!(ledger.audit(), Ok(()));

    Ok(())
}

#[test]
fn test_tamper_detection() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;
    ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received")?;
    mine(&mut ledger)?;
    ledger.queue_transaction("Distributor", "Pharmacy", "Product-1", "Delivered")?;
    mine(&mut ledger)?;

    let pow = ledger.proof_of_work();
    let mut blocks = ledger.export();
    assert!(validate_blocks(&blocks, &pow));

    blocks[1].transactions[0].status = "Counterfeit".to_string();
    assert!(!validate_blocks(&blocks, &pow));

    // Tampering is visible to every audit, never repaired.
    let mut blocks = ledger.export();
    blocks[0].proof += 1;
    assert!(!validate_blocks(&blocks, &pow));

    assert!(ledger.validate_chain());

    Ok(())
}

#[test]
fn test_nanosecond_timestamp_tamper_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig {
        difficulty: 2,
        ..LedgerConfig::default()
    };
    let mut ledger = Ledger::from_config(&config)?;
    ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received")?;
    mine(&mut ledger)?;
    mine(&mut ledger)?;

    let pow = ledger.proof_of_work();
    let one_ns = chrono::Duration::nanoseconds(1);

    let mut blocks = ledger.export();
    blocks[1].timestamp += one_ns;
    assert_ne!(blocks[1], ledger.blocks()[1]);
    assert!(!validate_blocks(&blocks, &pow));

    let mut blocks = ledger.export();
    blocks[1].transactions[0].created_at += one_ns;
    assert!(!validate_blocks(&blocks, &pow));

    assert!(ledger.validate_chain());

    Ok(())
}

#[test]
fn test_forged_proof_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;
    mine(&mut ledger)?;

    let pow = ledger.proof_of_work();
    let mut blocks = ledger.export();
    let last_proof = blocks[0].proof;
    let forged = (0..).find(|p| !pow.is_valid_proof(last_proof, *p)).unwrap();
    blocks[1].proof = forged;

    let outcome = mediledger::blockchain::audit_blocks(&blocks, &pow);
    assert_eq!(outcome, Err(ChainFault::InvalidProof { index: 2 }));
    assert!(mediledger::blockchain::audit_blocks(&[], &pow).is_err());

    Ok(())
}

#[test]
fn test_invalid_proof_is_rejected_at_seal() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;
    ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received")?;

    let bad = (0..).find(|p| !ledger.is_valid_proof(GENESIS_PROOF, *p)).unwrap();
    match ledger.seal_block(bad, None) {
        Err(LedgerError::InvalidProofSupplied { last_proof, proof }) => {
            assert_eq!(last_proof, GENESIS_PROOF);
            assert_eq!(proof, bad);
        }
        other => panic!("expected InvalidProofSupplied, got {:?}", other),
    }
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.pending().len(), 1);

    Ok(())
}

#[test]
fn test_proof_determinism_and_minimality() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = test_ledger(3)?;

    let first = ledger.solve_proof_of_work(GENESIS_PROOF)?;
    let second = ledger.solve_proof_of_work(GENESIS_PROOF)?;
    assert_eq!(first, second);
    assert!(ledger.is_valid_proof(GENESIS_PROOF, first));
    for candidate in 0..first {
        assert!(!ledger.is_valid_proof(GENESIS_PROOF, candidate));
    }

    Ok(())
}

#[test]
fn test_bounded_search_surfaces_exhaustion() -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig {
        difficulty: 64,
        max_attempts: Some(2_000),
        ..LedgerConfig::default()
    };
    let ledger = Ledger::from_config(&config)?;
    assert_eq!(ledger.search_limits(), SearchLimits::attempts(2_000));

    assert_eq!(
        ledger.solve_proof_of_work(GENESIS_PROOF),
        Err(LedgerError::ProofSearchExhausted { attempts: 2_000 })
    );
    assert_eq!(ledger.proof_of_work(), ProofOfWork::new(64)?);

    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = LedgerConfig {
        difficulty: 0,
        ..LedgerConfig::default()
    };
    assert!(matches!(
        Ledger::from_config(&config),
        Err(LedgerError::InvalidDifficulty(0))
    ));
}

#[test]
fn test_tracking_history_across_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = test_ledger(2)?;
    ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received")?;
    mine(&mut ledger)?;
    ledger.queue_transaction("Distributor", "Pharmacy", "Product-1", "Ready for Transport")?;
    mine(&mut ledger)?;
    ledger.queue_transaction("Pharmacy", "Patient", "Product-1", "Dispensed")?;

    let history = ledger.history("Product-1");
    let trail: Vec<(Option<u64>, &str)> = history
        .iter()
        .map(|e| (e.block_index, e.transaction.status.as_str()))
        .collect();
    assert_eq!(
        trail,
        vec![
            (Some(2), "Received"),
            (Some(3), "Ready for Transport"),
            (None, "Dispensed"),
        ]
    );

    Ok(())
}
