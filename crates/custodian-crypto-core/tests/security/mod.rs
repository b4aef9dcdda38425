mod entropy_quality;
mod secret_masking;
mod tamper_evidence;
