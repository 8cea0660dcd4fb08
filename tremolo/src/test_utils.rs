use crate::constraints::TypeConstraints;
use crate::instance::{Candidate, EventAnnotation, SentenceInstance, Token};

/// A small ACE-like ontology shared by the unit tests.
pub(crate) fn attack_constraints() -> TypeConstraints {
    let mut constraints = TypeConstraints::new();
    constraints.add_event_type("Attack", "Conflict");
    constraints.add_event_type("Transport", "Movement");
    constraints.mark_supertype_exception("Transport");
    constraints.add_role("Attack", "Agent");
    constraints.add_role("Attack", "Victim");
    constraints.add_role("Attack", "Place");
    constraints.mark_independent_role("Place");
    constraints
}

fn token(surface: &str, pos: &str) -> Token {
    Token::new(
        surface,
        vec![format!("w={surface}"), format!("pos={pos}")],
    )
    .possible_trigger(false)
}

/// "The soldiers attacked the village": one trigger candidate at index 2,
/// argument candidates over tokens 1 and 4, gold roles Agent and Victim.
pub(crate) fn five_token_instance() -> SentenceInstance {
    let tokens = vec![
        token("The", "DT"),
        token("soldiers", "NNS"),
        token("attacked", "VBD").possible_trigger(true),
        token("the", "DT"),
        token("village", "NN"),
    ];
    let candidates = vec![
        Candidate::new("PER", "soldiers"),
        Candidate::new("GPE", "village"),
    ];
    let mut inst = SentenceInstance::new(tokens, candidates);
    inst.set_edge_text_features(2, 0, vec!["path=nsubj".into(), "type=PER".into()])
        .unwrap();
    inst.set_edge_text_features(2, 1, vec!["path=dobj".into(), "type=GPE".into()])
        .unwrap();
    inst.add_gold_event(EventAnnotation::new(
        2,
        "Attack",
        vec![(0, "Agent".into()), (1, "Victim".into())],
    ))
    .unwrap();
    inst
}

/// Two sentences in corpus format, matching [`five_token_instance`] plus a
/// shorter one with a second event type.
#[cfg(feature = "train")]
pub(crate) fn toy_corpus() -> &'static str {
    "\
T\tThe\t0\tw=The,pos=DT
T\tsoldiers\t0\tw=soldiers,pos=NNS
T\tattacked\t1\tw=attacked,pos=VBD
T\tthe\t0\tw=the,pos=DT
T\tvillage\t0\tw=village,pos=NN
C\tPER\tsoldiers
C\tGPE\tvillage
F\t2\t0\tpath=nsubj,type=PER
F\t2\t1\tpath=dobj,type=GPE
E\t2\tAttack\t0:Agent,1:Victim
EOS
T\tHe\t0\tw=He,pos=PRP
T\tdied\t1\tw=died,pos=VBD
T\tyesterday\t0\tw=yesterday,pos=NN
C\tPER\tHe
F\t1\t0\tpath=nsubj,type=PER
E\t1\tDie\t0:Victim
EOS
"
}
