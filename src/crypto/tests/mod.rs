mod range_proof_tests;
